//! Prometheus text rendering of probe results.

use crate::registry::Registry;
use crate::store::MetricsStore;

pub const EXPIRY_METRIC: &str = "ssl_watch_domain_expiry";
pub const DEAD_METRIC: &str = "ssl_watch_domain_dead";
pub const UNRESOLVED_METRIC: &str = "ssl_watch_domain_unresolved";

/// Escape a label value for the text exposition format.
pub fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Render the three certificate gauge families.
///
/// Each family carries its `# TYPE` line even when it has no samples.
/// Domains are rendered in sorted order; endpoints in IP order.
pub fn render(store: &MetricsStore, registry: &Registry) -> String {
    let mut expiry = format!("# TYPE {} gauge\n", EXPIRY_METRIC);
    let mut dead = format!("# TYPE {} gauge\n", DEAD_METRIC);
    let mut unresolved = format!("# TYPE {} gauge\n", UNRESOLVED_METRIC);

    let mut domains = store.list_domains();
    domains.sort();

    for domain in &domains {
        // Flushed between listing and reading.
        let Some(endpoints) = store.get(domain) else {
            continue;
        };
        let service = escape_label(&registry.service_name(domain).unwrap_or_default());
        let domain_label = escape_label(domain);

        if endpoints.is_empty() {
            unresolved.push_str(&format!(
                "{}{{domain=\"{}\",service=\"{}\"}} 1\n",
                UNRESOLVED_METRIC, domain_label, service
            ));
            continue;
        }

        for (ip, endpoint) in &endpoints {
            let ip = escape_label(ip);
            if endpoint.alive {
                expiry.push_str(&format!(
                    "{}{{domain=\"{}\",service=\"{}\",sha=\"{}\",ip=\"{}\",cn=\"{}\",alt_names=\"{}\",valid=\"{}\"}} {}\n",
                    EXPIRY_METRIC,
                    domain_label,
                    service,
                    escape_label(&endpoint.fingerprint),
                    ip,
                    escape_label(&endpoint.common_name),
                    endpoint.alt_names,
                    endpoint.valid,
                    endpoint.expiry
                ));
            } else {
                dead.push_str(&format!(
                    "{}{{domain=\"{}\",service=\"{}\",ip=\"{}\"}} 1\n",
                    DEAD_METRIC, domain_label, service, ip
                ));
            }
        }
    }

    expiry.push_str(&dead);
    expiry.push_str(&unresolved);
    expiry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Endpoint, Endpoints};

    fn alive(cn: &str, expiry: i64) -> Endpoint {
        Endpoint {
            alive: true,
            valid: true,
            common_name: cn.to_string(),
            alt_names: 2,
            expiry,
            fingerprint: "ab12".to_string(),
        }
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_label("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_label("plain"), "plain");
    }

    #[test]
    fn test_empty_store_renders_type_lines() {
        let out = render(&MetricsStore::new(), &Registry::new());
        assert_eq!(
            out,
            "# TYPE ssl_watch_domain_expiry gauge\n\
             # TYPE ssl_watch_domain_dead gauge\n\
             # TYPE ssl_watch_domain_unresolved gauge\n"
        );
    }

    #[test]
    fn test_renders_each_outcome() {
        let registry = Registry::new();
        registry
            .update(br#"{"web": {"domains": {"a.example.com": [], "b.example.com": []}}}"#)
            .unwrap();
        let store = MetricsStore::new();

        let mut a = Endpoints::new();
        a.insert("192.0.2.1".into(), alive("a.example.com", 1_900_000_000));
        a.insert("192.0.2.2".into(), Endpoint::dead());
        store.set("a.example.com", a);
        store.set("b.example.com", Endpoints::new());

        let out = render(&store, &registry);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines,
            vec![
                "# TYPE ssl_watch_domain_expiry gauge",
                "ssl_watch_domain_expiry{domain=\"a.example.com\",service=\"web\",sha=\"ab12\",ip=\"192.0.2.1\",cn=\"a.example.com\",alt_names=\"2\",valid=\"true\"} 1900000000",
                "# TYPE ssl_watch_domain_dead gauge",
                "ssl_watch_domain_dead{domain=\"a.example.com\",service=\"web\",ip=\"192.0.2.2\"} 1",
                "# TYPE ssl_watch_domain_unresolved gauge",
                "ssl_watch_domain_unresolved{domain=\"b.example.com\",service=\"web\"} 1",
            ]
        );
    }

    #[test]
    fn test_unknown_service_is_empty_label() {
        let store = MetricsStore::new();
        store.set("orphan.example.com", Endpoints::new());

        let out = render(&store, &Registry::new());
        assert!(out.contains("ssl_watch_domain_unresolved{domain=\"orphan.example.com\",service=\"\"} 1"));
    }

    #[test]
    fn test_cn_is_escaped() {
        let store = MetricsStore::new();
        let mut endpoints = Endpoints::new();
        endpoints.insert("192.0.2.1".into(), alive("evil\"cn", 1));
        store.set("x.example.com", endpoints);

        let out = render(&store, &Registry::new());
        assert!(out.contains("cn=\"evil\\\"cn\""));
    }
}
