//! `Debug.*`: only registered when test reports are enabled.

use crate::bridge::registry::{MethodTable, void};
use crate::security::SecurityLevel::TrustedAppOnly;

pub fn register(table: &mut MethodTable) {
    table.register("Debug.publishTestReport", TrustedAppOnly, |inv| {
        let suite = inv.params.required_str("testSuite")?;
        let xml = inv.params.required_str("xml")?;
        inv.terminal.reporter.publish_test_report(suite, xml);
        void()
    });
}

#[cfg(test)]
mod tests {
    use crate::bridge::testing::Harness;
    use serde_json::json;

    #[test]
    fn test_publish_requires_trusted_app() {
        let h = Harness::new();
        let params = json!({ "testSuite": "org.hbbtv_0001", "xml": "<testcase/>" });

        let untrusted = h.launch(1);
        assert_eq!(
            h.call("Debug.publishTestReport", &untrusted, params.clone()),
            h.err("SecurityError")
        );
        assert!(h.terminal.calls().is_empty());

        let trusted = h.launch(3);
        assert_eq!(
            h.call("Debug.publishTestReport", &trusted, params),
            h.ok(json!(null))
        );
        assert_eq!(h.terminal.calls(), vec!["publish_test_report"]);
    }
}
