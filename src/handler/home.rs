//! Home page

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::http;

pub const HOME_HTML: &str = "<h3>Sklearn Prediction Home CI/CD Pipeline with AzureDevops 2</h3>";

pub fn serve_home(is_head: bool) -> Response<Full<Bytes>> {
    http::build_html_response(HOME_HTML, is_head)
}
