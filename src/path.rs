//! Path parsing and manipulation utilities.
//!
//! Paths are `/` separated. A leading separator makes a path absolute, otherwise
//! it is taken relative to the current directory. Empty components are ignored and
//! `.`/`..` have no special meaning.

use crate::config::*;
use crate::{Error, Result};

pub fn is_absolute(path: &str) -> bool {
    path.starts_with(PATH_SEPARATOR)
}

/// Non-empty components of `path`, each checked against the name length bound.
pub fn components(path: &str) -> Result<Vec<&str>> {
    let components: Vec<&str> = path.split(PATH_SEPARATOR).filter(|s| !s.is_empty()).collect();
    for component in &components {
        if component.len() > FILE_NAME_MAX_LEN {
            return Err(Error::InvalidFileName);
        }
    }
    Ok(components)
}

/// Splits `path` into the directory components leading to it and its final name.
pub fn split(path: &str) -> Result<(Vec<&str>, &str)> {
    let mut components = components(path)?;
    let name = components.pop().ok_or(Error::InvalidPath)?;
    Ok((components, name))
}

/// Joins components into an absolute path.
pub fn join(components: &[&str]) -> String {
    let mut path = String::from(ROOT_PATH);
    path.push_str(&components.join(ROOT_PATH));
    path
}

/// Rewrites `path` as an absolute path, prefixing `cur_path` when it is relative.
/// The result must fit in a directory entry.
pub fn to_absolute(cur_path: &str, path: &str) -> Result<String> {
    let mut all = if is_absolute(path) {
        Vec::new()
    } else {
        components(cur_path)?
    };
    all.extend(components(path)?);
    let absolute = join(&all);
    if absolute.len() > FILE_PATH_MAX_LEN {
        return Err(Error::PathTooLong);
    }
    Ok(absolute)
}

/// True if `path` is `ancestor` or lies below it. Both must be absolute.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    let path = components(path).unwrap_or_default();
    let ancestor = components(ancestor).unwrap_or_default();
    path.starts_with(&ancestor)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split() {
        assert_eq!(split("/a/b/c").unwrap(), (vec!["a", "b"], "c"));
        assert_eq!(split("c").unwrap(), (vec![], "c"));
        assert_eq!(split("/a//b/").unwrap(), (vec!["a"], "b"));
        assert_eq!(split("/"), Err(Error::InvalidPath));
        assert_eq!(split(""), Err(Error::InvalidPath));
        assert_eq!(split("/toolongname"), Err(Error::InvalidFileName));
    }

    #[test]
    fn test_to_absolute() {
        assert_eq!(to_absolute("/", "f").unwrap(), "/f");
        assert_eq!(to_absolute("/sub", "f").unwrap(), "/sub/f");
        assert_eq!(to_absolute("/sub", "x/f").unwrap(), "/sub/x/f");
        assert_eq!(to_absolute("/sub", "/f").unwrap(), "/f");
        assert_eq!(to_absolute("/", "/").unwrap(), "/");
        let deep = "/aaaaaaaaa/bbbbbbbbb/ccccccccc/ddddddddd";
        assert_eq!(to_absolute("/", deep).unwrap(), deep);
        assert_eq!(to_absolute(deep, "e"), Err(Error::PathTooLong));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("/a/b", "/a"));
        assert!(is_within("/a", "/a"));
        assert!(!is_within("/ab", "/a"));
        assert!(!is_within("/a", "/a/b"));
        assert!(is_within("/a", "/"));
    }
}
