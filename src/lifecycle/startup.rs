//! Startup banner.

use std::net::SocketAddr;

/// Human-readable lines announcing where the proxy listens.
pub fn banner(addr: SocketAddr, proxy_path: &str) -> Vec<String> {
    vec![
        format!("Server running at http://localhost:{}", addr.port()),
        format!(
            "Cross-origin requests to {} are forwarded to the inference service",
            proxy_path
        ),
    ]
}

/// Print the banner to stdout.
pub fn print_banner(addr: SocketAddr, proxy_path: &str) {
    for line in banner(addr, proxy_path) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_names_local_url() {
        let lines = banner("0.0.0.0:8000".parse().unwrap(), "/api/proxy/generate");
        assert_eq!(lines[0], "Server running at http://localhost:8000");
        assert!(lines[1].contains("/api/proxy/generate"));
    }
}
