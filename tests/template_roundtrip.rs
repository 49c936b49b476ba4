//! End-to-end template round trips through the envelope codec
//!
//! These tests stand in for the generated catalog: a handful of hand-written
//! property records (AppMesh gateway route, EKS cluster and nodegroup)
//! registered against a real registry, driven through whole-document decode
//! and re-encode in both JSON and YAML spellings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use cumulus_template::{
    DecodeOptions, DeletionPolicy, Resource, ResourceProperties, ResourceRegistry, Tag, Template,
    Value,
};

// =============================================================================
// Fixture catalog records
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GatewayRouteSpec {
    #[serde(rename = "Priority", default, skip_serializing_if = "Option::is_none")]
    priority: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GatewayRouteProperties {
    #[serde(rename = "MeshName")]
    mesh_name: Value,
    #[serde(rename = "MeshOwner", default, skip_serializing_if = "Option::is_none")]
    mesh_owner: Option<Value>,
    #[serde(rename = "VirtualGatewayName")]
    virtual_gateway_name: Value,
    #[serde(
        rename = "GatewayRouteName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    gateway_route_name: Option<Value>,
    #[serde(rename = "Spec")]
    spec: GatewayRouteSpec,
    #[serde(rename = "Tags", default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<Tag>,
}

impl ResourceProperties for GatewayRouteProperties {
    const TYPE: &'static str = "AWS::AppMesh::GatewayRoute";
    const REQUIRES_PROPERTIES: bool = true;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterProperties {
    #[serde(rename = "Name")]
    name: Value,
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    version: Option<Value>,
    #[serde(rename = "RoleArn", default, skip_serializing_if = "Option::is_none")]
    role_arn: Option<Value>,
}

impl ResourceProperties for ClusterProperties {
    const TYPE: &'static str = "AWS::EKS::Cluster";
    const REQUIRES_PROPERTIES: bool = true;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodegroupProperties {
    #[serde(rename = "ClusterName")]
    cluster_name: Value,
    #[serde(rename = "Subnets", default, skip_serializing_if = "Vec::is_empty")]
    subnets: Vec<Value>,
    #[serde(rename = "Tags", default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<Tag>,
}

impl ResourceProperties for NodegroupProperties {
    const TYPE: &'static str = "AWS::EKS::Nodegroup";
}

fn registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry.register::<GatewayRouteProperties>();
    registry.register::<ClusterProperties>();
    registry.register::<NodegroupProperties>();
    registry
}

// =============================================================================
// Story: reading a document back and re-submitting it unchanged
// =============================================================================

#[test]
fn gateway_route_document_roundtrips_identically() {
    let input = json!({
        "Resources": {
            "Route": {
                "Type": "AWS::AppMesh::GatewayRoute",
                "Properties": {
                    "MeshName": "m1",
                    "VirtualGatewayName": "vg1",
                    "Spec": {},
                },
            },
        },
    });
    let template = Template::from_node(&input, &registry(), &DecodeOptions::strict()).unwrap();
    assert_eq!(template.to_node().unwrap(), input);

    let route = template.get("Route").unwrap();
    let typed = route.downcast_ref::<GatewayRouteProperties>().unwrap();
    let properties = typed.properties.as_ref().unwrap();
    assert_eq!(properties.mesh_name, Value::string("m1"));
    assert_eq!(properties.mesh_owner, None);
    assert_eq!(properties.spec, GatewayRouteSpec { priority: None });
}

#[test]
fn constructed_template_survives_decode() {
    let mut cluster = Resource::new(ClusterProperties {
        name: Value::string("api"),
        version: Some(Value::string("1.29")),
        role_arn: Some(Value::get_att("ServiceRole", "Arn")),
    });
    cluster.deletion_policy = DeletionPolicy::Retain;
    cluster.condition = Some("HasControlPlane".to_string());

    let mut nodegroup = Resource::new(NodegroupProperties {
        cluster_name: Value::reference("ControlPlane"),
        subnets: vec![
            Value::import_value(Value::sub("${Network}-subnet-a")),
            Value::import_value(Value::sub("${Network}-subnet-b")),
        ],
        tags: vec![
            Tag::new("cluster", Value::reference("ControlPlane")),
            Tag::new("team", "platform"),
        ],
    });
    nodegroup.depends_on = vec!["ControlPlane".to_string(), "ServiceRole".to_string()];
    nodegroup
        .metadata
        .insert("managed-by".to_string(), json!("cumulus"));

    let mut template = Template::new();
    template.description = Some("api cluster".to_string());
    template.insert("ControlPlane", cluster);
    template.insert("Workers", nodegroup);

    let text = template.to_json().unwrap();
    let back = Template::from_json(&text, &registry(), &DecodeOptions::strict()).unwrap();
    assert_eq!(back.to_json().unwrap(), text);

    let workers = back.get("Workers").unwrap();
    let typed = workers.downcast_ref::<NodegroupProperties>().unwrap();
    assert_eq!(
        typed.depends_on,
        vec!["ControlPlane".to_string(), "ServiceRole".to_string()]
    );
    assert_eq!(typed.properties.as_ref().unwrap().tags.len(), 2);
    // tag order is the declaration order, not sorted
    assert_eq!(typed.properties.as_ref().unwrap().tags[0].key, "cluster");
}

#[test]
fn depends_on_order_survives_decode_and_reencode() {
    let input = json!({
        "Resources": {
            "Workers": {
                "Type": "AWS::EKS::Nodegroup",
                "Properties": {"ClusterName": "api"},
                "DependsOn": ["B", "A"],
            },
        },
    });
    let template = Template::from_node(&input, &registry(), &DecodeOptions::strict()).unwrap();
    let node = template.to_node().unwrap();
    // exact caller order, never resorted alphabetically
    assert_eq!(
        node["Resources"]["Workers"]["DependsOn"],
        json!(["B", "A"])
    );
}

#[test]
fn unset_directives_never_appear_on_the_wire() {
    let template_node = json!({
        "Resources": {
            "ControlPlane": {
                "Type": "AWS::EKS::Cluster",
                "Properties": {"Name": "api"},
            },
        },
    });
    let template =
        Template::from_node(&template_node, &registry(), &DecodeOptions::strict()).unwrap();
    let entry = &template.to_node().unwrap()["Resources"]["ControlPlane"];
    let keys: Vec<_> = entry.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["Properties", "Type"]);
}

// =============================================================================
// Story: strict decoding protects against half-understood documents
// =============================================================================

#[test]
fn unknown_envelope_key_fails_the_whole_document() {
    let input = json!({
        "Resources": {
            "Route": {
                "Type": "AWS::AppMesh::GatewayRoute",
                "Properties": {"MeshName": "m", "VirtualGatewayName": "vg", "Spec": {}},
                "NotARealKey": 1,
            },
        },
    });
    let err = Template::from_node(&input, &registry(), &DecodeOptions::strict()).unwrap_err();
    assert!(err.to_string().contains("NotARealKey"));
    assert_eq!(err.path(), Some("$.Resources.Route.NotARealKey"));
}

#[test]
fn preserve_mode_roundtrips_a_newer_schema_document() {
    let input = json!({
        "Resources": {
            "Route": {
                "Type": "AWS::AppMesh::GatewayRoute",
                "Properties": {"MeshName": "m", "VirtualGatewayName": "vg", "Spec": {}},
                "CreationPolicy": {"ResourceSignal": {"Count": 1}},
            },
        },
    });
    let template =
        Template::from_node(&input, &registry(), &DecodeOptions::preserving()).unwrap();
    assert_eq!(template.to_node().unwrap(), input);
}

#[test]
fn unknown_property_field_fails_even_in_preserve_mode() {
    // Preserve applies to envelope keys; property-level strictness belongs
    // to the record itself
    let input = json!({
        "Resources": {
            "Route": {
                "Type": "AWS::AppMesh::GatewayRoute",
                "Properties": {
                    "MeshName": "m",
                    "VirtualGatewayName": "vg",
                    "Spec": {},
                    "FutureField": true,
                },
            },
        },
    });
    let err =
        Template::from_node(&input, &registry(), &DecodeOptions::preserving()).unwrap_err();
    assert!(err.to_string().contains("FutureField"));
}

#[test]
fn missing_required_property_names_field_and_path() {
    let input = json!({
        "Resources": {
            "Route": {
                "Type": "AWS::AppMesh::GatewayRoute",
                "Properties": {"MeshName": "m", "Spec": {}},
            },
        },
    });
    let err = Template::from_node(&input, &registry(), &DecodeOptions::strict()).unwrap_err();
    assert_eq!(err.path(), Some("$.Resources.Route.Properties"));
    assert!(err.to_string().contains("VirtualGatewayName"));
    assert!(err.to_string().contains("AWS::AppMesh::GatewayRoute"));
}

// =============================================================================
// Story: intrinsic functions compose anywhere a literal could appear
// =============================================================================

#[test]
fn nested_intrinsics_flow_through_the_whole_pipeline() {
    let input = json!({
        "Resources": {
            "ControlPlane": {
                "Type": "AWS::EKS::Cluster",
                "Properties": {
                    "Name": {"Fn::Join": ["-", [{"Ref": "Env"}, "cluster"]]},
                    "RoleArn": {
                        "Fn::If": [
                            "UseSharedRole",
                            {"Fn::ImportValue": {"Fn::Sub": "${Env}-role"}},
                            {"Fn::GetAtt": ["ServiceRole", "Arn"]},
                        ],
                    },
                },
            },
        },
    });
    let template = Template::from_node(&input, &registry(), &DecodeOptions::strict()).unwrap();
    assert_eq!(template.to_node().unwrap(), input);

    let cluster = template
        .get("ControlPlane")
        .unwrap()
        .downcast_ref::<ClusterProperties>()
        .unwrap();
    let properties = cluster.properties.as_ref().unwrap();
    assert_eq!(
        properties.name,
        Value::join("-", vec![Value::reference("Env"), Value::string("cluster")])
    );
}

#[test]
fn tag_values_may_be_intrinsics() {
    let input = json!({
        "Resources": {
            "Workers": {
                "Type": "AWS::EKS::Nodegroup",
                "Properties": {
                    "ClusterName": "api",
                    "Tags": [
                        {"Key": "Name", "Value": {"Fn::Sub": "${AWS::StackName}-workers"}},
                        {"Key": "env", "Value": "prod"},
                    ],
                },
            },
        },
    });
    let template = Template::from_node(&input, &registry(), &DecodeOptions::strict()).unwrap();
    assert_eq!(template.to_node().unwrap(), input);
}

// =============================================================================
// Story: YAML templates decode identically to their JSON spelling
// =============================================================================

#[test]
fn yaml_and_json_spellings_decode_to_the_same_document() {
    let yaml = r#"
Resources:
  ControlPlane:
    Type: AWS::EKS::Cluster
    DeletionPolicy: Retain
    Properties:
      Name:
        Fn::Join:
          - "-"
          - - Ref: Env
            - cluster
"#;
    let json_text = json!({
        "Resources": {
            "ControlPlane": {
                "Type": "AWS::EKS::Cluster",
                "DeletionPolicy": "Retain",
                "Properties": {
                    "Name": {"Fn::Join": ["-", [{"Ref": "Env"}, "cluster"]]},
                },
            },
        },
    });

    let from_yaml = Template::from_yaml(yaml, &registry(), &DecodeOptions::strict()).unwrap();
    let from_json =
        Template::from_node(&json_text, &registry(), &DecodeOptions::strict()).unwrap();
    assert_eq!(
        from_yaml.to_node().unwrap(),
        from_json.to_node().unwrap()
    );

    let cluster = from_yaml
        .get("ControlPlane")
        .unwrap()
        .downcast_ref::<ClusterProperties>()
        .unwrap();
    assert_eq!(cluster.deletion_policy, DeletionPolicy::Retain);
}

// =============================================================================
// Story: typed round-trip identity, including presence distinctions
// =============================================================================

#[test]
fn typed_resource_roundtrip_identity() {
    let mut resource = Resource::new(GatewayRouteProperties {
        mesh_name: Value::string("m1"),
        mesh_owner: None,
        virtual_gateway_name: Value::string("vg1"),
        gateway_route_name: Some(Value::string("")),
        spec: GatewayRouteSpec {
            priority: Some(Value::int(10)),
        },
        tags: vec![Tag::new("zeta", "1"), Tag::new("alpha", "2")],
    });
    resource.depends_on = vec!["Mesh".to_string()];
    resource.update_replace_policy = cumulus_template::UpdateReplacePolicy::Snapshot;

    let node = resource.to_node().unwrap();
    let back =
        Resource::<GatewayRouteProperties>::from_node(&node, &DecodeOptions::strict()).unwrap();
    assert_eq!(back, resource);

    // present-but-empty stays distinct from absent
    let properties = back.properties.as_ref().unwrap();
    assert_eq!(properties.gateway_route_name, Some(Value::string("")));
    assert_eq!(properties.mesh_owner, None);
    // tag declaration order survived both directions
    assert_eq!(properties.tags[0].key, "zeta");
}

#[test]
fn sub_variable_map_roundtrips_through_a_document() {
    let input = json!({
        "Resources": {
            "ControlPlane": {
                "Type": "AWS::EKS::Cluster",
                "Properties": {
                    "Name": {"Fn::Sub": ["${env}-${suffix}", {
                        "env": {"Ref": "Env"},
                        "suffix": "eks",
                    }]},
                },
            },
        },
    });
    let template = Template::from_node(&input, &registry(), &DecodeOptions::strict()).unwrap();
    assert_eq!(template.to_node().unwrap(), input);

    let cluster = template
        .get("ControlPlane")
        .unwrap()
        .downcast_ref::<ClusterProperties>()
        .unwrap();
    let expected = Value::sub_with(
        "${env}-${suffix}",
        BTreeMap::from([
            ("env".to_string(), Value::reference("Env")),
            ("suffix".to_string(), Value::string("eks")),
        ]),
    );
    assert_eq!(cluster.properties.as_ref().unwrap().name, expected);
}
