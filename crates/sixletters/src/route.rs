//! WebSocket upgrade paths.

use sixletters_protocol::{RoomCode, is_valid_code, is_valid_name};

const BASE: &str = "/sixletters/ws/";

/// What a connection asked to do, decoded from its upgrade path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/sixletters/ws/hostcoop/<name>`: host a new round as `name`.
    Host { name: String },
    /// `/sixletters/ws/join/c<code>`: join an existing round.
    Join { code: RoomCode },
}

impl Route {
    /// Decodes an upgrade path. Returns `None` for anything that isn't a
    /// well-formed route.
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix(BASE)?;
        if let Some(name) = rest.strip_prefix("hostcoop/") {
            is_valid_name(name).then(|| Self::Host {
                name: name.to_string(),
            })
        } else if let Some(code) = rest.strip_prefix("join/c") {
            is_valid_code(code).then(|| Self::Join {
                code: RoomCode(code.to_string()),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_route() {
        assert_eq!(
            Route::parse("/sixletters/ws/hostcoop/alice"),
            Some(Route::Host {
                name: "alice".into()
            })
        );
    }

    #[test]
    fn test_join_route() {
        assert_eq!(
            Route::parse("/sixletters/ws/join/ceu1ab12c"),
            Some(Route::Join {
                code: RoomCode("eu1ab12c".into())
            })
        );
    }

    #[test]
    fn test_rejects_bad_routes() {
        for path in [
            "/",
            "/sixletters/ws/",
            "/sixletters/ws/hostcoop/",
            "/sixletters/ws/hostcoop/bob_smith",
            "/sixletters/ws/hostcoop/abcdefghijk",
            "/sixletters/ws/join/ab12c",
            "/sixletters/ws/join/cab1",
            "/sixletters/ws/join/cab-12c",
            "/sixletters/ws/hostcomp/alice",
            "/other/ws/hostcoop/alice",
        ] {
            assert_eq!(Route::parse(path), None, "{path}");
        }
    }
}
