//! `Programme.*`: schedule metadata and searches.

use crate::bridge::registry::{MethodTable, result, void};
use crate::security::SecurityLevel::BroadcastAppOnly;
use crate::terminal::types::SearchRequest;

pub fn register(table: &mut MethodTable) {
    table.register("Programme.getPresentFollowing", BroadcastAppOnly, |inv| {
        let ccid = inv.params.required_str("ccid")?;
        result(inv.terminal.programmes.present_following(ccid))
    });

    // Results arrive as a MetadataSearch event.
    table.register("Programme.startSearch", BroadcastAppOnly, |inv| {
        let p = inv.params;
        let request = SearchRequest {
            query_id: p.required_i32("queryId")?,
            query: p.object("query")?.clone().into(),
            offset: p.optional_i32("offset", 0)?,
            count: p.required_i32("count")?,
            channel_constraints: p.optional_str_list("channelConstraintList")?,
        };
        inv.terminal.programmes.start_search(request);
        void()
    });

    table.register("Programme.abortSearch", BroadcastAppOnly, |inv| {
        let query_id = inv.params.required_i32("queryId")?;
        inv.terminal.programmes.abort_search(query_id);
        void()
    });
}

#[cfg(test)]
mod tests {
    use crate::bridge::events::names;
    use crate::bridge::testing::Harness;
    use serde_json::json;

    #[test]
    fn test_present_following() {
        let h = Harness::new();
        let token = h.launch(1);
        let programmes = h.result(h.call(
            "Programme.getPresentFollowing",
            &token,
            json!({ "ccid": "ccid:dvbt.1" }),
        ));
        assert_eq!(programmes.as_array().unwrap().len(), 2);
        assert_eq!(programmes[0]["channelId"], json!("ccid:dvbt.1"));
    }

    #[test]
    fn test_search_result_is_an_event() {
        let h = Harness::new();
        let token = h.launch(1);
        let response = h.call(
            "Programme.startSearch",
            &token,
            json!({ "queryId": 4, "query": {}, "count": 1 }),
        );
        assert_eq!(response, h.ok(json!(null)));

        let events = h.events.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, names::METADATA_SEARCH);
        assert_eq!(events[0].properties["programmeList"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_search_query_must_be_object() {
        let h = Harness::new();
        let token = h.launch(1);
        let response = h.call(
            "Programme.startSearch",
            &token,
            json!({ "queryId": 4, "query": "Now", "count": 1 }),
        );
        assert_eq!(response, h.err("parameter query must be an object"));
    }
}
