//! End-to-end scenarios for architecture builds
//!
//! These tests drive the library the way the CLI does: state exports and
//! configuration files on disk in, fragment and merged documents out.

use serde_json::{json, Value};
use tfarch::config::OutputFormat;
use tfarch::merge::{merge_fragments, Fragments};
use tfarch::output::{read_fragment, write_document};
use tfarch::pipeline::{self, ArchitectureBuild};
use tfarch::region::region_from_file;
use tfarch::resource::{load_records_or_empty, records_from_state};
use tfarch::topology::TopologyOptions;
use tfarch::ArchError;

fn state(resources: Value) -> Value {
    json!({
        "format_version": "1.0",
        "terraform_version": "1.5.7",
        "values": {"root_module": {"resources": resources}}
    })
}

fn vpc_subnet_instance_state() -> Value {
    state(json!([
        {
            "address": "aws_vpc.main",
            "mode": "managed",
            "type": "aws_vpc",
            "name": "main",
            "values": {"id": "vpc-1", "cidr_block": "10.0.0.0/16", "enable_dns_support": true}
        },
        {
            "address": "aws_subnet.app",
            "mode": "managed",
            "type": "aws_subnet",
            "name": "app",
            "values": {
                "id": "sn-1",
                "vpc_id": "vpc-1",
                "cidr_block": "10.0.1.0/24",
                "availability_zone": "us-east-1a",
                "map_public_ip_on_launch": false
            }
        },
        {
            "address": "aws_instance.web",
            "mode": "managed",
            "type": "aws_instance",
            "name": "web",
            "values": {
                "id": "i-1",
                "subnet_id": "sn-1",
                "instance_type": "t3.micro",
                "ami": "ami-0c55b159cbfafe1f0"
            }
        },
        {
            "address": "aws_security_group.web",
            "mode": "managed",
            "type": "aws_security_group",
            "name": "web",
            "values": {"id": "sg-1", "vpc_id": "vpc-1"}
        }
    ]))
}

mod topology_scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_network_subnet_instance() {
        let records = records_from_state(&vpc_subnet_instance_state()).unwrap();
        let doc = pipeline::topology_document(&records, None, TopologyOptions::default()).unwrap();

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "region": "unknown",
                "networks": [{
                    "name": "main",
                    "id": "vpc-1",
                    "cidr_block": "10.0.0.0/16",
                    "subnets": [{
                        "name": "app",
                        "id": "sn-1",
                        "network_id": "vpc-1",
                        "cidr_block": "10.0.1.0/24",
                        "availability_zone": "us-east-1a",
                        "visibility": "private",
                        "instances": [{
                            "name": "web",
                            "id": "i-1",
                            "instance_type": "t3.micro",
                            "image_id": "ami-0c55b159cbfafe1f0",
                            "subnet_id": "sn-1"
                        }]
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_network_without_cidr_fails_fast() {
        let state = state(json!([
            {"type": "aws_vpc", "name": "main", "values": {"id": "vpc-1"}}
        ]));
        let records = records_from_state(&state).unwrap();

        let err = pipeline::topology_document(&records, None, TopologyOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ArchError::MissingField { kind: "network", field: "cidr_block", .. }
        ));
    }

    #[test]
    fn test_resource_list_not_a_list() {
        let err = records_from_state(&json!({"values": {"root_module": {"resources": 42}}}))
            .unwrap_err();
        assert!(matches!(err, ArchError::MalformedInput(_)));
    }
}

mod load_balancer_scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_instances_in_listed_subnets_are_members() {
        let state = state(json!([
            {"type": "aws_elb", "name": "front", "values": {
                "id": "elb-1",
                "dns_name": "front-123.us-east-1.elb.amazonaws.com",
                "subnets": ["sn-1", "sn-2"]
            }},
            {"type": "aws_instance", "name": "a", "values": {
                "id": "i-1", "subnet_id": "sn-1", "instance_type": "t3.micro", "ami": "ami-1"
            }},
            {"type": "aws_instance", "name": "b", "values": {
                "id": "i-2", "subnet_id": "sn-3", "instance_type": "t3.micro", "ami": "ami-1"
            }}
        ]));
        let records = records_from_state(&state).unwrap();

        let doc = pipeline::load_balancer_document(&records, Some("us-east-1")).unwrap();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "region": "us-east-1",
                "load_balancers": [{
                    "name": "front",
                    "id": "elb-1",
                    "dns_name": "front-123.us-east-1.elb.amazonaws.com",
                    "instances": [{"name": "a", "id": "i-1"}]
                }]
            })
        );
    }
}

mod database_scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_and_order() {
        let state = state(json!([
            {"type": "aws_db_subnet_group", "name": "db", "values": {
                "id": "main-db-subnets", "subnet_ids": ["sn-1", "sn-2"]
            }},
            {"type": "aws_db_instance", "name": "primary", "values": {
                "id": "db-abc",
                "engine": "postgres",
                "instance_class": "db.t3.micro",
                "db_name": "app",
                "arn": "arn:aws:rds:us-west-2:123:db:primary",
                "region": "us-west-2"
            }},
            {"type": "aws_dynamodb_table", "name": "locks", "values": {"id": "terraform-locks"}}
        ]));
        let records = records_from_state(&state).unwrap();

        let doc = pipeline::database_document(&records, Some("eu-west-1")).unwrap();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "region": "us-west-2",
                "databases": [
                    {
                        "kind": "db_instance",
                        "name": "primary",
                        "id": "db-abc",
                        "engine": "postgres",
                        "instance_class": "db.t3.micro",
                        "db_name": "app",
                        "arn": "arn:aws:rds:us-west-2:123:db:primary"
                    },
                    {
                        "kind": "db_table",
                        "name": "locks",
                        "id": "terraform-locks",
                        "engine": "unknown",
                        "instance_class": "unknown",
                        "db_name": "unknown",
                        "arn": "unknown"
                    }
                ],
                "subnet_groups": [{
                    "name": "db",
                    "id": "main-db-subnets",
                    "description": "unknown",
                    "subnet_ids": ["sn-1", "sn-2"]
                }]
            })
        );
    }
}

mod merge_scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_is_a_field_union() {
        let a = json!({"region": "us-east-1", "networks": [{"id": "n1"}]});
        let b = json!({"load_balancers": [{"id": "lb1"}]});
        let c = json!({"databases": [{"id": "d1"}], "subnet_groups": []});

        let merged = merge_fragments(
            Fragments {
                topology: Some(&a),
                load_balancers: Some(&b),
                databases: Some(&c),
            },
            None,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({
                "region": "us-east-1",
                "networks": [{"id": "n1"}],
                "load_balancers": [{"id": "lb1"}],
                "databases": [{"id": "d1"}],
                "subnet_groups": []
            })
        );
    }

    #[test]
    fn test_fragments_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let main_tf = dir.path().join("main.tf");
        std::fs::write(
            &main_tf,
            "provider \"aws\" {\n  region = \"us-east-2\"\n}\n",
        )
        .unwrap();
        let state_path = dir.path().join("terraform_state.json");
        std::fs::write(
            &state_path,
            serde_json::to_string(&vpc_subnet_instance_state()).unwrap(),
        )
        .unwrap();

        let region = region_from_file(&main_tf);
        let records = load_records_or_empty(&state_path).unwrap();
        let build =
            ArchitectureBuild::from_records(&records, Some(&region), TopologyOptions::default())
                .unwrap();

        let topo_path = dir.path().join("out").join("architecture.json");
        let db_path = dir.path().join("out").join("db_architecture.json");
        write_document(&topo_path, &build.topology, OutputFormat::Json).unwrap();
        write_document(&db_path, &build.databases, OutputFormat::Json).unwrap();

        // The load balancer fragment was never written
        let topology = read_fragment(&topo_path);
        let load_balancers = read_fragment(&dir.path().join("out").join("elb_data.json"));
        let databases = read_fragment(&db_path);
        let merged = merge_fragments(
            Fragments {
                topology: topology.as_ref(),
                load_balancers: load_balancers.as_ref(),
                databases: databases.as_ref(),
            },
            Some(&region),
        )
        .unwrap();

        assert_eq!(merged.region, "us-east-2");
        assert_eq!(merged.networks, build.merged.networks);
        assert!(merged.load_balancers.is_empty());
        assert!(merged.databases.is_empty());
    }
}

mod collaborator_failures {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_inputs_produce_empty_documents() {
        let dir = tempfile::tempdir().unwrap();

        let region = region_from_file(&dir.path().join("main.tf"));
        let records = load_records_or_empty(&dir.path().join("terraform_state.json")).unwrap();
        let build =
            ArchitectureBuild::from_records(&records, Some(&region), TopologyOptions::default())
                .unwrap();

        assert_eq!(
            serde_json::to_value(&build.merged).unwrap(),
            json!({
                "region": "unknown",
                "networks": [],
                "load_balancers": [],
                "databases": [],
                "subnet_groups": []
            })
        );
    }

    #[test]
    fn test_unparseable_state_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terraform_state.json");
        std::fs::write(&path, "{ truncated").unwrap();

        assert!(load_records_or_empty(&path).unwrap().is_empty());
    }
}
