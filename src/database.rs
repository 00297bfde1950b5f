//! Database Extractor
//!
//! Flattens database and subnet-group records into output entries. No join
//! between databases and subnet groups is attempted.

use crate::document::{DatabaseResource, SubnetGroup, UNKNOWN};
use crate::resource::{DatabaseRecord, SubnetGroupRecord};

fn or_unknown(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

pub fn extract_databases(records: &[DatabaseRecord]) -> Vec<DatabaseResource> {
    records
        .iter()
        .map(|db| DatabaseResource {
            kind: db.kind,
            name: db.name.clone(),
            id: db.id.clone(),
            engine: or_unknown(&db.engine),
            instance_class: or_unknown(&db.instance_class),
            db_name: or_unknown(&db.db_name),
            arn: or_unknown(&db.arn),
        })
        .collect()
}

pub fn extract_subnet_groups(records: &[SubnetGroupRecord]) -> Vec<SubnetGroup> {
    records
        .iter()
        .map(|group| SubnetGroup {
            name: group.name.clone(),
            id: group.id.clone(),
            description: or_unknown(&group.description),
            subnet_ids: group.subnet_ids.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DatabaseKind;
    use serde_json::json;

    #[test]
    fn test_absent_fields_default_to_unknown() {
        let dbs = extract_databases(&[DatabaseRecord {
            kind: DatabaseKind::DbTable,
            name: "sessions".to_string(),
            id: "sessions-table".to_string(),
            engine: None,
            instance_class: None,
            db_name: None,
            arn: Some("arn:aws:dynamodb:us-east-1:1:table/sessions".to_string()),
            region: None,
        }]);

        assert_eq!(
            serde_json::to_value(&dbs[0]).unwrap(),
            json!({
                "kind": "db_table",
                "name": "sessions",
                "id": "sessions-table",
                "engine": "unknown",
                "instance_class": "unknown",
                "db_name": "unknown",
                "arn": "arn:aws:dynamodb:us-east-1:1:table/sessions"
            })
        );
    }

    #[test]
    fn test_subnet_group_defaults() {
        let groups = extract_subnet_groups(&[SubnetGroupRecord {
            name: "db".to_string(),
            id: "db-subnets".to_string(),
            description: None,
            subnet_ids: vec![],
        }]);
        assert_eq!(groups[0].description, UNKNOWN);
        assert!(groups[0].subnet_ids.is_empty());
    }
}
