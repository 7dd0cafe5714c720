//! Container hierarchy over resource IRIs.
//!
//! Pod containers are path based: a container IRI ends in `/`, and every
//! resource is contained by the IRI obtained by dropping its last path
//! segment.

use url::Url;

/// Whether the IRI names a container.
pub fn is_container(iri: &Url) -> bool {
    iri.path().ends_with('/')
}

/// The container that directly contains `iri`, or `None` at the storage
/// root.
pub fn parent_container(iri: &Url) -> Option<Url> {
    let path = iri.path();
    if path == "/" || path.is_empty() {
        return None;
    }

    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let cut = trimmed.rfind('/')?;

    let mut parent = iri.clone();
    parent.set_query(None);
    parent.set_fragment(None);
    parent.set_path(&trimmed[..=cut]);
    Some(parent)
}

/// All containers above `iri`, nearest first. The resource itself is not
/// included.
pub fn ancestors(iri: &Url) -> Vec<Url> {
    let mut chain = Vec::new();
    let mut current = parent_container(iri);
    while let Some(container) = current {
        current = parent_container(&container);
        chain.push(container);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iri(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn it_finds_parent_of_resource_and_container() {
        assert_eq!(
            parent_container(&iri("https://pod.example/a/b")),
            Some(iri("https://pod.example/a/"))
        );
        assert_eq!(
            parent_container(&iri("https://pod.example/a/b/")),
            Some(iri("https://pod.example/a/"))
        );
        assert_eq!(parent_container(&iri("https://pod.example/")), None);
    }

    #[test]
    fn it_lists_ancestors_nearest_first() {
        assert_eq!(
            ancestors(&iri("https://pod.example/alice/private/data/data-2")),
            vec![
                iri("https://pod.example/alice/private/data/"),
                iri("https://pod.example/alice/private/"),
                iri("https://pod.example/alice/"),
                iri("https://pod.example/"),
            ]
        );
    }

    #[test]
    fn it_ignores_query_and_fragment() {
        assert_eq!(
            parent_container(&iri("https://pod.example/a/card?x=1#me")),
            Some(iri("https://pod.example/a/"))
        );
    }

    #[test]
    fn it_detects_containers() {
        assert!(is_container(&iri("https://pod.example/a/")));
        assert!(!is_container(&iri("https://pod.example/a")));
    }
}
