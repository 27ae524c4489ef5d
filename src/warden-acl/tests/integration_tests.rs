//! Integration tests for the warden-acl crate.
//!
//! Covers:
//! - IP lists (blacklist/whitelist, CIDR, IPv6)
//! - Domain lists and normalization
//! - Predefined sets
//! - Rule files and configuration
//! - The thread-safe manager

use std::sync::Arc;
use std::thread;

use tempfile::TempDir;
use warden_acl::{
    Acl, AclConfig, AclError, AclManager, DomainAcl, IpAcl, ListMode, Permission, PredefinedSet,
    lookup, normalize_domain, read_list,
};

// ============================================================================
// IP LIST TESTS
// ============================================================================

mod ip_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blacklist_cidr() {
        let acl = IpAcl::new(["192.168.1.0/24", "10.0.0.0/8"], ListMode::Blacklist).unwrap();
        assert_eq!(acl.check("192.168.1.5").unwrap(), Permission::Denied);
        assert_eq!(acl.check("8.8.8.8").unwrap(), Permission::Allowed);
    }

    #[test]
    fn test_whitelist_mixed_families() {
        let acl = IpAcl::new(["2001:db8::/32", "203.0.113.9"], ListMode::Whitelist).unwrap();
        assert_eq!(acl.check("2001:db8::42").unwrap(), Permission::Allowed);
        assert_eq!(acl.check("203.0.113.9").unwrap(), Permission::Allowed);
        assert_eq!(acl.check("203.0.113.10").unwrap(), Permission::Denied);
        assert_eq!(acl.check("2001:db9::1").unwrap(), Permission::Denied);
    }

    #[test]
    fn test_construction_rejects_invalid_entries() {
        assert!(matches!(
            IpAcl::new(["10.0.0.1", "not-an-ip"], ListMode::Blacklist),
            Err(AclError::InvalidAddress(_))
        ));
        assert!(matches!(
            IpAcl::new(["10.0.0.0/33"], ListMode::Blacklist),
            Err(AclError::InvalidBlock(_))
        ));
        assert!(IpAcl::new(["", "  ", "10.0.0.1"], ListMode::Blacklist).is_ok());
    }

    #[test]
    fn test_check_rejects_blocks_and_garbage() {
        let acl = IpAcl::new(["10.0.0.0/8"], ListMode::Blacklist).unwrap();
        assert!(matches!(acl.check("10.0.0.0/8"), Err(AclError::InvalidAddress(_))));
        assert!(matches!(acl.check("example.com"), Err(AclError::InvalidAddress(_))));
    }

    #[test]
    fn test_add_is_not_atomic() {
        let mut acl = IpAcl::empty(ListMode::Blacklist);
        let result = acl.add(["1.1.1.1", "bogus", "2.2.2.2"]);
        assert!(result.is_err());
        assert_eq!(acl.ranges(), vec!["1.1.1.1"]);
    }

    #[test]
    fn test_overlapping_entries_are_kept() {
        let mut acl = IpAcl::new(["10.0.0.0/8", "10.0.0.1"], ListMode::Blacklist).unwrap();
        acl.add(["10.0.0.1/32", "10.0.0.1"]).unwrap();
        assert_eq!(acl.ranges(), vec!["10.0.0.0/8", "10.0.0.1", "10.0.0.1/32"]);
    }

    #[test]
    fn test_partial_remove() {
        let mut acl = IpAcl::new(["8.8.8.8", "9.9.9.9"], ListMode::Blacklist).unwrap();
        let err = acl.remove(["8.8.8.8", "1.1.1.1"]).unwrap_err();
        assert!(matches!(&err, AclError::EntryNotFound(missing) if missing == &["1.1.1.1"]));
        assert_eq!(acl.ranges(), vec!["9.9.9.9"]);
    }

    #[test]
    fn test_remove_is_by_original_text() {
        let mut acl = IpAcl::new(["10.0.0.1"], ListMode::Blacklist).unwrap();
        assert!(acl.remove(["10.0.0.1/32"]).is_err());
        assert_eq!(acl.len(), 1);
    }

    #[test]
    fn test_mapped_ipv6_block_denies_mapped_addresses() {
        let acl = IpAcl::new(["::ffff:0:0/96"], ListMode::Blacklist).unwrap();
        assert_eq!(acl.check("::ffff:127.0.0.1").unwrap(), Permission::Denied);
        assert_eq!(acl.check("::ffff:169.254.169.254").unwrap(), Permission::Denied);
        assert_eq!(acl.check("2001:db8::1").unwrap(), Permission::Allowed);
    }

    #[test]
    fn test_ipv4_mapped_address_matches_ipv4_block() {
        let acl = IpAcl::new(["192.168.0.0/16"], ListMode::Blacklist).unwrap();
        assert_eq!(acl.check("::ffff:192.168.4.4").unwrap(), Permission::Denied);
    }
}

// ============================================================================
// PREDEFINED SET TESTS
// ============================================================================

mod predefined_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blacklist_absorbs_denied_set() {
        let mut acl = IpAcl::empty(ListMode::Blacklist);
        acl.add_predefined_set_by_name("private_networks", false)
            .unwrap();
        assert_eq!(acl.len(), 3);
        assert_eq!(acl.check("10.1.2.3").unwrap(), Permission::Denied);
    }

    #[test]
    fn test_blacklist_ignores_allowed_set() {
        let mut acl = IpAcl::empty(ListMode::Blacklist);
        acl.add_predefined_set_by_name("private_networks", false)
            .unwrap();
        let before = acl.len();
        acl.add_predefined_set_by_name("private_networks", true)
            .unwrap();
        assert_eq!(acl.len(), before);
    }

    #[test]
    fn test_whitelist_absorbs_allowed_set() {
        let mut acl = IpAcl::empty(ListMode::Whitelist);
        acl.add_predefined_set(PredefinedSet::PublicDns, true).unwrap();
        assert_eq!(acl.check("1.1.1.1").unwrap(), Permission::Allowed);

        acl.add_predefined_set(PredefinedSet::LoopbackNetworks, false)
            .unwrap();
        assert_eq!(acl.check("127.0.0.1").unwrap(), Permission::Denied);
    }

    #[test]
    fn test_unknown_set() {
        let mut acl = IpAcl::empty(ListMode::Blacklist);
        assert!(matches!(
            acl.add_predefined_set_by_name("intranet", false),
            Err(AclError::UnknownCategory(_))
        ));
        assert!(lookup("intranet").is_none());
    }

    #[test]
    fn test_all_special_networks_is_union() {
        let all = lookup("all_special_networks").unwrap();
        for set in PredefinedSet::ALL {
            for range in set.ranges() {
                assert!(all.contains(range), "{set} block {range} missing");
            }
        }
        let mut sorted = all.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());
    }

    #[test]
    fn test_ssrf_targets_denied() {
        let acl = IpAcl::with_defaults(
            Vec::<String>::new(),
            ListMode::Blacklist,
            &[PredefinedSet::AllSpecialNetworks],
            false,
        )
        .unwrap();

        for target in [
            "127.0.0.1",
            "::1",
            "169.254.169.254",
            "10.0.0.5",
            "172.17.0.2",
            "192.168.1.1",
            "100.64.0.1",
            "fe80::1",
            "fd12:3456::1",
            "0.0.0.0",
        ] {
            assert_eq!(acl.check(target).unwrap(), Permission::Denied, "{target}");
        }
        assert_eq!(acl.check("93.184.216.34").unwrap(), Permission::Allowed);
    }
}

// ============================================================================
// DOMAIN LIST TESTS
// ============================================================================

mod domain_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_whitelist_subdomains() {
        let acl = DomainAcl::new(["example.com"], ListMode::Whitelist, true);
        assert_eq!(acl.check("api.example.com").unwrap(), Permission::Allowed);
        assert_eq!(acl.check("example.org").unwrap(), Permission::Denied);
    }

    #[test]
    fn test_suffix_correctness() {
        let acl = DomainAcl::new(["example.com"], ListMode::Blacklist, true);
        assert!(acl.matches("sub.example.com"));
        assert!(acl.matches("a.b.example.com"));
        assert!(!acl.matches("myexample.com"));
        assert!(!acl.matches("example.org"));
    }

    #[test]
    fn test_normalize_full_url() {
        assert_eq!(
            normalize_domain("HTTP://user:pw@WWW.Example.COM:8080/path?q=1#frag"),
            "example.com"
        );
    }

    #[test]
    fn test_polymorphic_checks() {
        let ip = IpAcl::new(["10.0.0.0/8"], ListMode::Blacklist).unwrap();
        let domain = DomainAcl::new(["example.com"], ListMode::Blacklist, true);
        let acls: Vec<(&dyn Acl, &str)> = vec![(&ip, "10.9.9.9"), (&domain, "x.example.com")];
        for (acl, value) in acls {
            assert_eq!(acl.check(value).unwrap(), Permission::Denied);
        }
    }
}

// ============================================================================
// RULE FILE TESTS
// ============================================================================

mod file_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ip_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blacklist.txt");

        let acl = IpAcl::new(["10.0.0.0/8", "2001:db8::1", "192.0.2.7"], ListMode::Blacklist)
            .unwrap();
        acl.save_to_file(&path, false).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# IP Blacklist - IPs in this list will be denied access\n"));

        let reloaded = IpAcl::from_file(&path, ListMode::Blacklist).unwrap();
        assert_eq!(reloaded.ranges(), acl.ranges());
    }

    #[test]
    fn test_domain_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("domains.txt");

        let acl = DomainAcl::new(["b.example", "a.example"], ListMode::Whitelist, true);
        acl.save_to_file(&path, false).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Domain Whitelist"));
        assert_eq!(read_list(&path).unwrap(), acl.domains());
    }

    #[test]
    fn test_file_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            IpAcl::from_file(&missing, ListMode::Blacklist),
            Err(AclError::FileNotFound(_))
        ));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "# only comments\n\n").unwrap();
        assert!(matches!(
            DomainAcl::from_file(&empty, ListMode::Blacklist, true),
            Err(AclError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_config_file() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("extra.txt");
        std::fs::write(&rules, "198.51.100.0/24 # partner\n").unwrap();

        let config_path = dir.path().join("acl.toml");
        let config = AclConfig::builder()
            .ip_range("203.0.113.5")
            .ip_file(&rules)
            .predefined_set(PredefinedSet::CloudMetadata)
            .domain_entry("evil.example")
            .build();
        std::fs::write(&config_path, config.to_toml_string().unwrap()).unwrap();

        let loaded = AclConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);

        let manager = AclManager::from_config(&loaded).unwrap();
        assert_eq!(manager.check_ip("198.51.100.20").unwrap(), Permission::Denied);
        assert_eq!(manager.check_ip("169.254.169.254").unwrap(), Permission::Denied);
        assert_eq!(manager.check_ip("203.0.113.6").unwrap(), Permission::Allowed);
        assert_eq!(
            manager.check_domain("cdn.evil.example").unwrap(),
            Permission::Denied
        );
    }
}

// ============================================================================
// MANAGER TESTS
// ============================================================================

mod manager_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_helpers() {
        let dir = TempDir::new().unwrap();
        let ip_path = dir.path().join("ip.txt");
        let domain_path = dir.path().join("domain.txt");

        let manager = AclManager::new();
        manager
            .set_ip_acl(["10.0.0.0/8", "::1"], ListMode::Blacklist)
            .unwrap();
        manager.set_domain_acl(["example.com"], ListMode::Blacklist, true);
        manager.save_ip_acl_to_file(&ip_path, false).unwrap();
        manager.save_domain_acl_to_file(&domain_path, false).unwrap();
        assert!(matches!(
            manager.save_ip_acl_to_file(&ip_path, false),
            Err(AclError::FileExists(_))
        ));

        let other = AclManager::new();
        other
            .set_ip_acl_from_file(&ip_path, ListMode::Whitelist)
            .unwrap();
        other
            .set_domain_acl_from_file(&domain_path, ListMode::Whitelist, false)
            .unwrap();
        assert_eq!(other.ip_ranges(), manager.ip_ranges());
        assert_eq!(other.domains(), manager.domains());
        assert_eq!(other.check_ip("10.2.3.4").unwrap(), Permission::Allowed);

        std::fs::write(dir.path().join("more.txt"), "192.0.2.1\n").unwrap();
        other.add_ip_from_file(dir.path().join("more.txt")).unwrap();
        assert_eq!(other.ip_ranges().unwrap().len(), 3);
    }

    #[test]
    fn test_listing_is_a_snapshot() {
        let manager = AclManager::new();
        manager.set_ip_acl(["1.1.1.1"], ListMode::Blacklist).unwrap();
        let snapshot = manager.ip_ranges().unwrap();
        manager.add_ip(["2.2.2.2"]).unwrap();
        assert_eq!(snapshot, vec!["1.1.1.1"]);
    }

    #[test]
    fn test_concurrent_checks_and_updates() {
        let manager = Arc::new(AclManager::new());
        manager
            .set_ip_acl(["10.0.0.0/8"], ListMode::Blacklist)
            .unwrap();
        manager.set_domain_acl(["example.com"], ListMode::Blacklist, true);

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let manager = Arc::clone(&manager);
            handles.push(thread::spawn(move || {
                for j in 0..100u8 {
                    assert_eq!(
                        manager.check_ip(&format!("10.{i}.{j}.1")).unwrap(),
                        Permission::Denied
                    );
                    assert_eq!(
                        manager.check_domain("www.api.example.com").unwrap(),
                        Permission::Denied
                    );
                }
            }));
        }

        let writer = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for j in 0..100u8 {
                    manager.add_ip([format!("192.0.2.{j}")]).unwrap();
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        writer.join().unwrap();
        assert_eq!(manager.ip_ranges().unwrap().len(), 101);
    }
}
