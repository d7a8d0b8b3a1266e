//! Request method recognition.
//!
//! Common verbs are interned against a read-only catalog so the hot path never
//! allocates for them. Anything else is still accepted and carried through as
//! its (upper-cased) literal text: recognition is an optimization, not a
//! validation gate.

use std::borrow::Cow;
use std::fmt;

/// The request method of a parsed request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// A verb from the static catalog.
    Known(&'static str),
    /// An extension method, upper-cased.
    Extension(String),
}

impl Method {
    pub const GET: Method = Method::Known("GET");
    pub const HEAD: Method = Method::Known("HEAD");
    pub const POST: Method = Method::Known("POST");
    pub const PUT: Method = Method::Known("PUT");
    pub const DELETE: Method = Method::Known("DELETE");
    pub const PATCH: Method = Method::Known("PATCH");

    /// Resolves a method token that has already been upper-cased.
    ///
    /// Matching dispatches on the exact token length first, one arm per
    /// length, then compares against the verbs of that length only.
    pub fn from_upper(token: &[u8]) -> Method {
        let known: Option<&'static str> = match token.len() {
            3 => match token {
                b"GET" => Some("GET"),
                b"PUT" => Some("PUT"),
                _ => None,
            },
            4 => match token {
                b"HEAD" => Some("HEAD"),
                b"POST" => Some("POST"),
                b"COPY" => Some("COPY"),
                b"LOCK" => Some("LOCK"),
                b"MOVE" => Some("MOVE"),
                _ => None,
            },
            5 => match token {
                b"PATCH" => Some("PATCH"),
                b"TRACE" => Some("TRACE"),
                b"MKCOL" => Some("MKCOL"),
                b"MERGE" => Some("MERGE"),
                _ => None,
            },
            6 => match token {
                b"DELETE" => Some("DELETE"),
                b"UNLOCK" => Some("UNLOCK"),
                b"REPORT" => Some("REPORT"),
                _ => None,
            },
            7 => match token {
                b"CONNECT" => Some("CONNECT"),
                b"OPTIONS" => Some("OPTIONS"),
                _ => None,
            },
            8 => match token {
                b"PROPFIND" => Some("PROPFIND"),
                b"CHECKOUT" => Some("CHECKOUT"),
                _ => None,
            },
            9 => match token {
                b"PROPPATCH" => Some("PROPPATCH"),
                _ => None,
            },
            10 => match token {
                b"MKACTIVITY" => Some("MKACTIVITY"),
                _ => None,
            },
            _ => None,
        };

        match known {
            Some(name) => Method::Known(name),
            None => Method::Extension(token.iter().map(|&b| b as char).collect()),
        }
    }

    /// Upper-cases `token` in place and resolves it.
    pub fn normalize(token: &mut [u8]) -> Method {
        token.make_ascii_uppercase();
        Method::from_upper(token)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Known(name) => name,
            Method::Extension(name) => name,
        }
    }

    /// The method name, borrowed from the catalog when it is a known verb.
    pub fn to_cow(&self) -> Cow<'static, str> {
        match self {
            Method::Known(name) => Cow::Borrowed(name),
            Method::Extension(name) => Cow::Owned(name.clone()),
        }
    }

    /// Returns true when the verb came from the static catalog.
    pub fn is_known(&self) -> bool {
        matches!(self, Method::Known(_))
    }

    /// Methods whose requests normally carry a body.
    pub fn expects_body(&self) -> bool {
        matches!(self.as_str(), "POST" | "PUT" | "PATCH")
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: [&str; 20] = [
        "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH", "COPY", "LOCK", "MKCOL", "MOVE",
        "PROPFIND", "PROPPATCH", "UNLOCK", "REPORT", "MKACTIVITY", "CHECKOUT", "MERGE",
    ];

    #[test]
    fn every_catalog_verb_is_interned() {
        for verb in CATALOG {
            let method = Method::from_upper(verb.as_bytes());
            assert_eq!(method, Method::Known(verb), "{verb}");
        }
    }

    #[test]
    fn lowercase_is_folded() {
        let mut token = *b"propfind";
        assert_eq!(Method::normalize(&mut token), Method::Known("PROPFIND"));
        assert_eq!(&token, b"PROPFIND");
    }

    #[test]
    fn no_match_across_lengths() {
        // prefixes and extensions of known verbs must not resolve to them
        assert_eq!(Method::from_upper(b"GE"), Method::Extension("GE".to_owned()));
        assert_eq!(Method::from_upper(b"GETS"), Method::Extension("GETS".to_owned()));
        assert_eq!(Method::from_upper(b"PATCHX"), Method::Extension("PATCHX".to_owned()));
        assert_eq!(Method::from_upper(b"PROPFINDS"), Method::Extension("PROPFINDS".to_owned()));
    }

    #[test]
    fn extension_methods_are_carried() {
        let mut token = *b"purge";
        let method = Method::normalize(&mut token);
        assert!(!method.is_known());
        assert_eq!(method.as_str(), "PURGE");
        assert_eq!(method.to_string(), "PURGE");
        assert!(matches!(method.to_cow(), Cow::Owned(_)));
        assert!(matches!(Method::GET.to_cow(), Cow::Borrowed("GET")));
    }

    #[test]
    fn body_methods() {
        assert!(Method::POST.expects_body());
        assert!(Method::PUT.expects_body());
        assert!(!Method::GET.expects_body());
        assert!(!Method::Extension("PURGE".to_owned()).expects_body());
    }
}
