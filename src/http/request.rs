use actix_web::http::Method;
use actix_web::HttpRequest;

// Typed access to the parts of an inbound request the view needs
pub trait RequestHead {
    fn method(&self) -> &Method;
    fn path(&self) -> &str;
    fn query_string(&self) -> &str;
    fn header(&self, name: &str) -> Option<&str>;
    fn headers(&self) -> Vec<(String, String)>;

    fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or("")
    }
}

impl RequestHead for HttpRequest {
    fn method(&self) -> &Method {
        HttpRequest::method(self)
    }

    fn path(&self) -> &str {
        HttpRequest::path(self)
    }

    fn query_string(&self) -> &str {
        HttpRequest::query_string(self)
    }

    fn header(&self, name: &str) -> Option<&str> {
        HttpRequest::headers(self).get(name).and_then(|v| v.to_str().ok())
    }

    fn headers(&self) -> Vec<(String, String)> {
        HttpRequest::headers(self)
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }
}

// Owned snapshot of the request, handed to resolvers as context data.
// HttpRequest holds an Rc, so it cannot travel into the schema itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub query_string: String,
    pub headers: Vec<(String, String)>, // Lower-cased names, in arrival order
}

impl RequestContext {
    pub fn from_head<R: RequestHead + ?Sized>(head: &R) -> Self {
        RequestContext {
            method: head.method().to_string(),
            path: head.path().to_string(),
            query_string: head.query_string().to_string(),
            headers: head.headers(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    // Looks up a cookie from the Cookie header
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("cookie"))
            .flat_map(|(_, v)| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }
}
