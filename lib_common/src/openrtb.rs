//! OpenRTB 2.1 core objects.
//!
//! Field names follow the OpenRTB wire contract; optional fields are skipped
//! on encode so that decode → encode round-trips produce stable payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level bid request object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imp: Vec<Imp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<i32>,
    #[serde(rename = "at", default, skip_serializing_if = "Option::is_none")]
    pub auction_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmax: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wseat: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bseat: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allimps: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cur: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wlang: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcat: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badv: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regs: Option<Regs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// An impression offered for auction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Imp {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric: Vec<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmp: Option<Pmp>,
    #[serde(
        rename = "displaymanager",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_manager: Option<String>,
    #[serde(
        rename = "displaymanagerver",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_manager_ver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instl: Option<i32>,
    #[serde(rename = "tagid", default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<String>,
    #[serde(rename = "bidfloor", default, skip_serializing_if = "Option::is_none")]
    pub bid_floor: Option<f64>,
    #[serde(
        rename = "bidfloorcur",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bid_floor_cur: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<i32>,
    #[serde(
        rename = "iframebuster",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub iframe_buster: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Banner-type impression details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
    #[serde(rename = "wmax", default, skip_serializing_if = "Option::is_none")]
    pub w_max: Option<i32>,
    #[serde(rename = "hmax", default, skip_serializing_if = "Option::is_none")]
    pub h_max: Option<i32>,
    #[serde(rename = "wmin", default, skip_serializing_if = "Option::is_none")]
    pub w_min: Option<i32>,
    #[serde(rename = "hmin", default, skip_serializing_if = "Option::is_none")]
    pub h_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<i32>,
    #[serde(rename = "btype", default, skip_serializing_if = "Vec::is_empty")]
    pub b_type: Vec<i32>,
    #[serde(rename = "battr", default, skip_serializing_if = "Vec::is_empty")]
    pub b_attr: Vec<i32>,
    #[serde(rename = "mimes", default, skip_serializing_if = "Vec::is_empty")]
    pub mimes: Vec<String>,
    #[serde(rename = "topframe", default, skip_serializing_if = "Option::is_none")]
    pub top_frame: Option<i32>,
    #[serde(rename = "expdir", default, skip_serializing_if = "Vec::is_empty")]
    pub exp_dir: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<Format>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Format {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
    #[serde(rename = "wratio", default, skip_serializing_if = "Option::is_none")]
    pub w_ratio: Option<i32>,
    #[serde(rename = "hratio", default, skip_serializing_if = "Option::is_none")]
    pub h_ratio: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Video-type impression details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "mimes", default, skip_serializing_if = "Vec::is_empty")]
    pub mimes: Vec<String>,
    #[serde(
        rename = "minduration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_duration: Option<i32>,
    #[serde(
        rename = "maxduration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
    #[serde(
        rename = "startdelay",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_delay: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linearity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
    #[serde(rename = "battr", default, skip_serializing_if = "Vec::is_empty")]
    pub b_attr: Vec<i32>,
    #[serde(
        rename = "maxextended",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_extended: Option<i32>,
    #[serde(
        rename = "minbitrate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_bitrate: Option<i32>,
    #[serde(
        rename = "maxbitrate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_bitrate: Option<i32>,
    #[serde(
        rename = "boxingallowed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub boxing_allowed: Option<i32>,
    #[serde(
        rename = "playbackmethod",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub playback_method: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delivery: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<i32>,
    #[serde(
        rename = "companionad",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub companion_ad: Vec<Banner>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api: Vec<i32>,
    #[serde(
        rename = "companiontype",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub companion_type: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Audio-type impression details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    #[serde(rename = "mimes", default, skip_serializing_if = "Vec::is_empty")]
    pub mimes: Vec<String>,
    #[serde(
        rename = "minduration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_duration: Option<i32>,
    #[serde(
        rename = "maxduration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<i32>,
    #[serde(
        rename = "startdelay",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_delay: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
    #[serde(rename = "battr", default, skip_serializing_if = "Vec::is_empty")]
    pub b_attr: Vec<i32>,
    #[serde(
        rename = "maxextended",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_extended: Option<i32>,
    #[serde(
        rename = "minbitrate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_bitrate: Option<i32>,
    #[serde(
        rename = "maxbitrate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_bitrate: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delivery: Vec<i32>,
    #[serde(
        rename = "companionad",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub companion_ad: Vec<Banner>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api: Vec<i32>,
    #[serde(
        rename = "companiontype",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub companion_type: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Private marketplace options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pmp {
    #[serde(
        rename = "private_auction",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_auction: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deals: Vec<Deal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    #[serde(rename = "bidfloor", default, skip_serializing_if = "Option::is_none")]
    pub bid_floor: Option<f64>,
    #[serde(
        rename = "bidfloorcur",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bid_floor_cur: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wseat: Vec<String>,
    #[serde(rename = "wadomain", default, skip_serializing_if = "Vec::is_empty")]
    pub w_adomain: Vec<String>,
    #[serde(rename = "at", default, skip_serializing_if = "Option::is_none")]
    pub auction_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Website details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,
    #[serde(
        rename = "sectioncat",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub section_cat: Vec<String>,
    #[serde(rename = "pagecat", default, skip_serializing_if = "Vec::is_empty")]
    pub page_cat: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<i32>,
    #[serde(
        rename = "privacypolicy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub privacy_policy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// App details. The exchange dereferences `id` only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,
    #[serde(
        rename = "sectioncat",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub section_cat: Vec<String>,
    #[serde(rename = "pagecat", default, skip_serializing_if = "Vec::is_empty")]
    pub page_cat: Vec<String>,
    #[serde(rename = "ver", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(rename = "storeurl", default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(
        rename = "privacypolicy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub privacy_policy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<Producer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<i32>,
    #[serde(
        rename = "contentrating",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_rating: Option<String>,
    #[serde(
        rename = "userrating",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(
        rename = "livestream",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub live_stream: Option<i32>,
    #[serde(rename = "len", default, skip_serializing_if = "Option::is_none")]
    pub length: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddable: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Device details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ua: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnt: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lmt: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    #[serde(
        rename = "devicetype",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub device_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osv: Option<String>,
    #[serde(rename = "hwv", default, skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppi: Option<i32>,
    #[serde(rename = "pxratio", default, skip_serializing_if = "Option::is_none")]
    pub px_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(
        rename = "connectiontype",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub connection_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub geo_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(rename = "utcoffset", default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// User information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "buyeruid", default, skip_serializing_if = "Option::is_none")]
    pub buyer_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yob: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(
        rename = "customdata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segment: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Regulatory conditions (e.g. COPPA).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Regs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coppa: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Top-level bid response object. The zero value is the "no-bid" response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidResponse {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "seatbid", default, skip_serializing_if = "Vec::is_empty")]
    pub seat_bid: Vec<SeatBid>,
    #[serde(rename = "bidid", default, skip_serializing_if = "Option::is_none")]
    pub bid_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cur: Option<String>,
    #[serde(
        rename = "customdata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbr: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// Bids grouped by bidder seat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatBid {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bid: Vec<Bid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

/// A bid for a single impression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "impid", default)]
    pub imp_id: String,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "adid", default, skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nurl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adm: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adomain: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iurl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crid: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cat: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attr: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<i32>,
    #[serde(rename = "dealid", default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_REQUEST: &str = r#"{
        "id": "1",
        "imp": [{"id": "1", "banner": {"w": 300, "h": 250}}],
        "app": {"id": "1250", "publisher": {"id": "1"}},
        "device": {"ua": "test-agent", "ip": "10.0.0.1"},
        "at": 2,
        "tmax": 120
    }"#;

    #[test]
    fn decodes_bid_request() {
        let request: BidRequest = serde_json::from_str(SAMPLE_REQUEST).expect("decode");
        assert_eq!(request.id, "1");
        assert_eq!(request.imp.len(), 1);
        assert_eq!(request.app.as_ref().unwrap().id.as_deref(), Some("1250"));
        assert_eq!(request.auction_type, Some(2));
        assert_eq!(request.tmax, Some(120));
    }

    #[test]
    fn round_trips_under_reencoding() {
        let request: BidRequest = serde_json::from_str(SAMPLE_REQUEST).expect("decode");
        let encoded = serde_json::to_vec(&request).expect("encode");
        let again: BidRequest = serde_json::from_slice(&encoded).expect("redecode");
        assert_eq!(request, again);
    }

    #[test]
    fn absent_optionals_are_not_serialized() {
        let request: BidRequest = serde_json::from_str(SAMPLE_REQUEST).expect("decode");
        let encoded = serde_json::to_string(&request).expect("encode");
        assert!(!encoded.contains("\"site\""));
        assert!(!encoded.contains("\"wseat\""));
        assert!(!encoded.contains("\"regs\""));
    }

    #[test]
    fn empty_bid_response_encodes_as_no_bid() {
        let encoded = serde_json::to_string(&BidResponse::default()).expect("encode");
        assert_eq!(encoded, r#"{"id":""}"#);
    }

    #[test]
    fn decodes_bid_response() {
        let raw = r#"{"id":"123","seatbid":[{"bid":[{"id":"123","impid":"123","price":1.0}]}]}"#;
        let response: BidResponse = serde_json::from_str(raw).expect("decode");
        assert_eq!(response.seat_bid.len(), 1);
        assert_eq!(response.seat_bid[0].bid[0].price, 1.0);
        let encoded = serde_json::to_string(&response).expect("encode");
        assert_eq!(encoded, raw);
    }
}
