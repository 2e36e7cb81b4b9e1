//! HTTP fixtures for E2E tests
//!
//! A single mockito server plays both remote roles: the forge serving the
//! platform archive and the web server that runs the bootstrap script.

use mockito::{Mock, ServerGuard};
use testbed_lib::provision::ServerEndpoint;
use testbed_lib::testing::platform_archive;

/// Path the archive is served from
pub const ARCHIVE_PATH: &str = "/typecho/typecho/archive/master.tar.gz";

/// Files of a minimal Typecho tree
pub const PLATFORM_FILES: [(&str, &str); 3] = [
    ("index.php", "<?php\nrequire_once 'config.inc.php';\n"),
    ("var/Typecho/Common.php", "<?php\nclass Typecho_Common {}\n"),
    ("usr/plugins/HelloWorld/Plugin.php", "<?php\n"),
];

/// Full archive URL on `server`
pub fn archive_url(server: &ServerGuard) -> String {
    format!("{}{}", server.url(), ARCHIVE_PATH)
}

/// Serve a `typecho-master` archive, expecting `hits` downloads
pub async fn mock_platform_archive(server: &mut ServerGuard, hits: usize) -> Mock {
    let body = platform_archive("typecho-master", &PLATFORM_FILES);
    server
        .mock("GET", ARCHIVE_PATH)
        .with_status(200)
        .with_header("content-type", "application/x-gzip")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// Answer the bootstrap script request with `status`, expecting `hits` calls
pub async fn mock_reactivation(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
    server
        .mock("GET", "/reactivate_restful.php")
        .with_status(status)
        .expect(hits)
        .create_async()
        .await
}

/// Endpoint pointing at the mock server
pub fn endpoint_for(server: &ServerGuard) -> ServerEndpoint {
    let address = server.host_with_port();
    let (host, port) = address.rsplit_once(':').unwrap_or((address.as_str(), "80"));
    ServerEndpoint {
        host: host.to_string(),
        port: port.to_string(),
    }
}
