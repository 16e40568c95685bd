//! Built-in migration manifest.
//!
//! Scripts are embedded at compile time and applied in the order listed here.
//! The `system` bootstrap entry must stay first: it defines the `migration`
//! history table every later entry is recorded in.

use crate::migrations::Migration;

pub(crate) fn builtin_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            "system",
            "0001_bootstrap",
            include_str!("../migrations/system/0001_bootstrap.surql"),
            true,
        ),
        Migration::new(
            "identity",
            "0001_users",
            include_str!("../migrations/identity/0001_users.surql"),
            false,
        ),
        Migration::new(
            "catalog",
            "0001_catalog",
            include_str!("../migrations/catalog/0001_catalog.surql"),
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_is_first() {
        let migrations = builtin_migrations();
        assert!(migrations[0].is_bootstrap);
        assert_eq!(migrations[0].slice_key, "system");
    }

    #[test]
    fn slice_versions_are_unique() {
        let migrations = builtin_migrations();
        let mut seen = std::collections::BTreeSet::new();
        for m in &migrations {
            assert!(
                seen.insert((m.slice_key, m.version)),
                "duplicate migration {}:{}",
                m.slice_key,
                m.version
            );
        }
    }
}
