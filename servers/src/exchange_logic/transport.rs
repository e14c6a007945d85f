use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};

use super::config::Config;
use super::metrics;

/// TLS sessions kept for resumption; bounds handshake cost under fan-out.
const TLS_SESSION_CACHE_SIZE: usize = 256;

/// DNS resolver that counts lookups per host. hyper resolves once per new
/// connection and pooled connections skip resolution entirely, so the
/// counter tracks dials rather than requests.
struct CountingResolver;

impl Resolve for CountingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        metrics::DSPIO_CONN_DIAL_TOTAL
            .with_label_values(&[name.as_str()])
            .inc();
        let host = name.as_str().to_string();
        Box::pin(async move {
            let addrs = tokio::net::lookup_host((host.as_str(), 0))
                .await
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)?
                .collect::<Vec<SocketAddr>>();
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

/// Accepts any server certificate. The playground bidders present
/// self-signed certificates.
#[derive(Debug)]
struct InsecureVerifier(rustls::crypto::CryptoProvider);

impl ServerCertVerifier for InsecureVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

fn tls_config(config: &Config) -> anyhow::Result<rustls::ClientConfig> {
    let provider = rustls::crypto::ring::default_provider();

    let builder = rustls::ClientConfig::builder_with_provider(provider.clone().into())
        .with_safe_default_protocol_versions()
        .context("tls protocol versions")?;

    let mut tls = if config.insecure_skip_verify {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(InsecureVerifier(provider)))
            .with_no_client_auth()
    } else {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots).with_no_client_auth()
    };

    tls.resumption = rustls::client::Resumption::store(Arc::new(
        rustls::client::ClientSessionMemoryCache::new(TLS_SESSION_CACHE_SIZE),
    ));
    tls.alpn_protocols = if config.force_http2 {
        vec![b"h2".to_vec(), b"http/1.1".to_vec()]
    } else {
        vec![b"http/1.1".to_vec()]
    };

    Ok(tls)
}

/// Builds the process-wide outbound client shared by every pool worker.
/// Created once at startup; connection reuse to the stable DSP hostnames
/// dominates latency.
pub fn build_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    log::info!(
        "transport: dial_timeout {:?}, keep_alive {:?}, idle_conn_timeout {:?}, \
         max_idle_conns {} (per host {}), response_header_timeout {:?}, \
         expect_continue_timeout {:?}, force_http2 {}, insecure_skip_verify {}",
        config.dial_timeout,
        config.keep_alive,
        config.idle_conn_timeout,
        config.max_idle_conns,
        config.max_idle_conns_per_host,
        config.response_header_timeout,
        config.expect_continue_timeout,
        config.force_http2,
        config.insecure_skip_verify,
    );

    // The idle pool is bounded per host; max_idle_conns (the total bound) and
    // expect_continue_timeout have no equivalent on this client and are
    // surfaced in the startup log only.
    let mut builder = reqwest::Client::builder()
        .use_preconfigured_tls(tls_config(config)?)
        .pool_max_idle_per_host(config.max_idle_conns_per_host)
        .pool_idle_timeout(config.idle_conn_timeout)
        .connect_timeout(config.dial_timeout)
        .tcp_keepalive(config.keep_alive)
        .read_timeout(config.response_header_timeout)
        .dns_resolver(Arc::new(CountingResolver));

    if !config.force_http2 {
        builder = builder.http1_only();
    }

    builder.build().context("building dsp client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_config(extra: &[&str]) -> Config {
        let mut args = vec![
            "server_exchange",
            "--apps-cache-path",
            "d/apps.json",
            "--dsps-cache-path",
            "d/dsps.json",
        ];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).expect("config")
    }

    #[test]
    fn builds_with_defaults() {
        build_client(&test_config(&[])).expect("client");
    }

    #[test]
    fn builds_with_verification_enabled_and_http1_only() {
        build_client(&test_config(&[
            "--insecure-skip-verify",
            "false",
            "--force-http2",
            "false",
        ]))
        .expect("client");
    }

    #[tokio::test]
    async fn resolver_counts_dials_per_host() {
        use axum::routing::get;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let app = axum::Router::new().route("/ping", get(|| async { "pong" }));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let before = metrics::DSPIO_CONN_DIAL_TOTAL
            .with_label_values(&["localhost"])
            .get();

        // A hostname URL goes through the resolver; an IP literal would not.
        let _ = rustls::crypto::ring::default_provider().install_default();
        let client = reqwest::Client::builder()
            .dns_resolver(Arc::new(CountingResolver))
            .build()
            .expect("client");
        let body = client
            .get(format!("http://localhost:{port}/ping"))
            .send()
            .await
            .expect("request")
            .text()
            .await
            .expect("body");
        assert_eq!(body, "pong");

        let after = metrics::DSPIO_CONN_DIAL_TOTAL
            .with_label_values(&["localhost"])
            .get();
        assert!(after > before);
    }
}
