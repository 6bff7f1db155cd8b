use super::response::{write_body, write_status};
use may_minihttp::{HttpService, Request, Response};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Handler bound to a route. Takes no request data and returns the bytes to serve.
pub type RouteHandler = Arc<dyn Fn() -> Arc<String> + Send + Sync>;

/// Path of the single route this crate binds.
pub const ROOT_PATH: &str = "/";

/// Error returned when binding a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A handler is already bound to this path on the instance
    AlreadyBound {
        /// The path that was bound twice
        path: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::AlreadyBound { path } => {
                write!(f, "route '{}' is already bound on this server instance", path)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// Path-to-handler bindings of one server instance.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteHandler>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `path`. A path can only be bound once per table.
    pub fn bind(&mut self, path: &str, handler: RouteHandler) -> Result<(), RouteError> {
        if self.routes.contains_key(path) {
            return Err(RouteError::AlreadyBound {
                path: path.to_string(),
            });
        }
        self.routes.insert(path.to_string(), handler);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&RouteHandler> {
        self.routes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.routes.keys().collect();
        paths.sort();
        f.debug_struct("RouteTable").field("paths", &paths).finish()
    }
}

/// `may_minihttp` service answering from a frozen [`RouteTable`].
///
/// Cloned once per connection by the server, so the table sits behind an `Arc`.
#[derive(Clone)]
pub struct RouteService {
    routes: Arc<RouteTable>,
}

/// What the service does with a request, decided from method and path alone.
enum Dispatch<'a> {
    Serve { handler: &'a RouteHandler, head: bool },
    MethodNotAllowed,
    NotFound,
}

impl RouteService {
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes: Arc::new(routes),
        }
    }

    fn dispatch<'a>(&'a self, method: &str, raw_path: &str) -> Dispatch<'a> {
        let path = raw_path.split('?').next().unwrap_or(ROOT_PATH);
        match self.routes.get(path) {
            Some(handler) => match method {
                "GET" => Dispatch::Serve {
                    handler,
                    head: false,
                },
                "HEAD" => Dispatch::Serve {
                    handler,
                    head: true,
                },
                _ => Dispatch::MethodNotAllowed,
            },
            None => Dispatch::NotFound,
        }
    }
}

impl HttpService for RouteService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        match self.dispatch(req.method(), req.path()) {
            Dispatch::Serve { handler, head } => {
                let body = handler();
                write_status(res, 200);
                res.header("Content-Type: text/html; charset=utf-8");
                if !head {
                    write_body(res, &body);
                }
            }
            Dispatch::MethodNotAllowed => {
                write_status(res, 405);
                res.header("Allow: GET, HEAD");
            }
            Dispatch::NotFound => write_status(res, 404),
        }
        Ok(())
    }
}
