#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::parser::parse;
#[cfg(test)]
use indoc::indoc;

const HAZARD_SCENE: &str = indoc! {r#"
    [gd_scene load_steps=4 format=2]
    [ext_resource path="res://Player/Player.tscn" type="PackedScene" id=1]
    [ext_resource path="res://World/tile_set.svg" type="Texture" id=2]
    [ext_resource path="res://World/Hazard.tscn" type="PackedScene" id=3]

    [sub_resource type="ConvexPolygonShape2D" id=1]
    points = PoolVector2Array( 16, 64, 128, 64, 128, 128, 16, 128 )

    [node name="RootNode" type="Node2D"]

    [node name="Hazards" type="Area2D" parent="."]

    [node name="TrapFloorSpikes" parent="Hazards" instance=ExtResource( 3 )]
    position = Vector2( 687.645, -209.178 )

    [node name="TrapFloorSpikes2" parent="Hazards" instance=ExtResource( 3 )]
    position = Vector2( 811.747, -209.178 )

    [editable path="Hazards"]
    [connection signal="area_entered" from="Hazards" to="." method="_on_Hazards_area_entered"]
"#};

fn scene(text: &str) -> Result<Scene, TscnError> {
    Scene::from_document(&parse(text).expect("scene should parse"))
}

fn first_section(text: &str) -> Section {
    parse(text).expect("text should parse").sections.remove(0)
}

#[test]
fn test_convert_scene() {
    let scene = scene(HAZARD_SCENE).unwrap();

    assert_eq!(scene.format, Some(2));
    assert_eq!(scene.load_steps, Some(4));
    assert_eq!(scene.ext_resources.len(), 3);
    assert_eq!(scene.sub_resources.len(), 1);
    assert_eq!(scene.editables.len(), 1);
    assert_eq!(scene.editables[0].path, "Hazards");

    assert_eq!(scene.root().name, "RootNode");
    let hazards = scene.node("Hazards").unwrap();
    assert_eq!(hazards.node_type.as_deref(), Some("Area2D"));
    assert_eq!(hazards.child_count(), 2);

    let spikes = scene.node("Hazards/TrapFloorSpikes").unwrap();
    let source = scene.instance_of(spikes).unwrap();
    assert_eq!(source.path, "res://World/Hazard.tscn");
    assert_eq!(source.resource_type, "PackedScene");

    let shape = scene.sub_resource(1i64).unwrap();
    assert_eq!(shape.resource_type, "ConvexPolygonShape2D");
    assert!(shape.fields.contains_key("points"));

    let conn = &scene.connections[0];
    assert_eq!(conn.signal, "area_entered");
    assert_eq!(conn.from, "Hazards");
    assert_eq!(conn.to, ".");
    assert_eq!(conn.method, "_on_Hazards_area_entered");
    assert_eq!(conn.flags, None);
    assert!(conn.binds.is_none());
}

#[test]
fn test_convert_format_three_scene() {
    let scene = scene(indoc! {r#"
        [gd_scene load_steps=2 format=3 uid="uid://b7x3k2"]
        [ext_resource type="Script" uid="uid://c4n1" path="res://player.gd" id="1_abcd"]
        [sub_resource type="RectangleShape2D" id="RectangleShape2D_x1"]
        size = Vector2(32, 32)
        [node name="Player" type="CharacterBody2D"]
        script = ExtResource("1_abcd")
        [node name="Shape" type="CollisionShape2D" parent="."]
        shape = SubResource("RectangleShape2D_x1")
        [connection signal="ready" from="." to="." method="_on_ready" flags=3 binds=[ 1, "two" ]]
    "#})
    .unwrap();

    assert_eq!(scene.format, Some(3));
    assert_eq!(scene.uid.as_deref(), Some("uid://b7x3k2"));

    let script = scene.ext_resource("1_abcd").unwrap();
    assert_eq!(script.uid.as_deref(), Some("uid://c4n1"));
    assert_eq!(script.id, ResourceId::Str("1_abcd".into()));
    assert!(scene.sub_resource("RectangleShape2D_x1").is_some());

    let conn = &scene.connections[0];
    assert_eq!(conn.flags, Some(3));
    assert_eq!(conn.binds.as_ref().and_then(Value::as_array).map(|b| b.len()), Some(2));
}

#[test]
fn test_scene_rejects_other_headers() {
    let err = scene("[gd_resource]").unwrap_err();
    match err {
        TscnError::WrongFileKind { expected, found } => {
            assert_eq!(expected, "gd_scene");
            assert_eq!(found, "gd_resource");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let err = scene("config_version=4").unwrap_err();
    assert_eq!(err.code(), 303);
}

#[test]
fn test_scene_invalid_sections() {
    for text in [
        "[gd_scene]\n[ext_resource]",
        "[gd_scene]\n[sub_resource]",
        "[gd_scene]\n[editable]",
        "[gd_scene]\n[connection]",
    ] {
        let err = scene(text).unwrap_err();
        assert!(
            matches!(err, TscnError::MissingAttribute { .. }),
            "{} gave {:?}",
            text,
            err
        );
    }
}

#[test]
fn test_scene_unknown_section() {
    let err = scene("[gd_scene]\n[this_does_not_exist]").unwrap_err();
    match err {
        TscnError::InvalidResourceType { tag, position } => {
            assert_eq!(tag, "this_does_not_exist");
            assert_eq!(position.line, 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_scene_invalid_node_tree() {
    let err = scene("[gd_scene]\n[node parent=\".\" type=\"Node2D\"]").unwrap_err();
    assert!(matches!(err, TscnError::MissingRoot { .. }));
}

#[test]
fn test_ext_resource_required_attributes() {
    let cases = [
        (r#"[gd_scene] [ext_resource]"#, Some("path")),
        (r#"[gd_scene] [ext_resource path="res://Test.tscn"]"#, Some("type")),
        (r#"[gd_scene] [ext_resource path="res://Test.tscn" type="PackedScene"]"#, Some("id")),
        (r#"[gd_scene] [ext_resource path="res://Test.tscn" type="PackedScene" id=1]"#, None),
    ];

    for (text, missing) in cases {
        let result = ExtResource::try_from(&first_section(text));
        match (result, missing) {
            (Ok(res), None) => assert_eq!(res.id, ResourceId::Int(1)),
            (Err(TscnError::MissingAttribute { attribute, .. }), Some(expected)) => {
                assert_eq!(attribute, expected)
            }
            (other, _) => panic!("{}: unexpected {:?}", text, other),
        }
    }
}

#[test]
fn test_ext_resource_wrong_attribute_type() {
    let section = first_section(r#"[gd_scene] [ext_resource path=5 type="PackedScene" id=1]"#);
    match ExtResource::try_from(&section).unwrap_err() {
        TscnError::InvalidAttributeType { attribute, expected, found, .. } => {
            assert_eq!(attribute, "path");
            assert_eq!(expected, "a string");
            assert_eq!(found, "integer");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let section = first_section(r#"[gd_scene] [ext_resource path="a" type="b" id=1.5]"#);
    assert!(ExtResource::try_from(&section).is_err());
}

#[test]
fn test_sub_resource_fields_last_wins() {
    let section = first_section(indoc! {r#"
        [gd_scene]
        [sub_resource type="TileSet" id=2]
        0/name = "first"
        0/name = "second"
    "#});
    let res = SubResource::try_from(&section).unwrap();
    assert_eq!(res.fields.len(), 1);
    assert_eq!(res.fields["0/name"].as_str(), Some("second"));
}

#[test]
fn test_editable_and_connection_sections() {
    let editable = Editable::try_from(&first_section(r#"[gd_scene] [editable path="TestNode"]"#)).unwrap();
    assert_eq!(editable.path, "TestNode");

    let missing_method = first_section(r#"[gd_scene] [connection signal="s" from="." to="."]"#);
    assert!(Connection::try_from(&missing_method).is_err());

    let bad_flags = first_section(r#"[gd_scene] [connection signal="s" from="." to="." method="m" flags="x"]"#);
    assert!(matches!(
        Connection::try_from(&bad_flags),
        Err(TscnError::InvalidAttributeType { .. })
    ));
}

#[test]
fn test_convert_resource() {
    let doc = parse(indoc! {r#"
        [gd_resource type="Environment" load_steps=2 format=2]

        [sub_resource type="ProceduralSky" id=1]

        [resource]
        background_mode = 2
        background_sky = SubResource( 1 )
    "#})
    .unwrap();

    let res = Resource::from_document(&doc).unwrap();
    assert_eq!(res.resource_type, "Environment");
    assert_eq!(res.format, Some(2));
    assert_eq!(res.sub_resources.len(), 1);
    assert_eq!(res.field("background_mode").and_then(Value::as_int), Some(2));
    assert_eq!(
        res.field("background_sky").and_then(Value::as_call).map(|c| c.name.as_str()),
        Some("SubResource")
    );
}

#[test]
fn test_resource_errors() {
    let err = Resource::from_document(&parse("[gd_resource format=2]").unwrap()).unwrap_err();
    assert!(matches!(err, TscnError::MissingAttribute { .. }));

    let err = Resource::from_document(&parse("[gd_resource type=3]").unwrap()).unwrap_err();
    assert!(matches!(err, TscnError::InvalidAttributeType { .. }));

    let err = Resource::from_document(&parse("[gd_resource type=\"Theme\"]\n[node name=\"A\"]").unwrap())
        .unwrap_err();
    assert!(matches!(err, TscnError::InvalidResourceType { .. }));

    let err = Resource::from_document(&parse("[gd_scene]").unwrap()).unwrap_err();
    assert!(matches!(err, TscnError::WrongFileKind { .. }));
}

#[test]
fn test_convert_project() {
    let doc = parse(indoc! {r#"
        ; Engine configuration file.
        config_version=4

        [application]

        config/name="Your first Godot Game"
        config/icon="res://icon.png"

        [input]

        jump={
        "deadzone": 0.5,
        "events": [ Object(InputEventKey,"resource_local_to_scene":false,"device":0,"scancode":32) ]
        }

        [customsection]
        customfield=1337
    "#})
    .unwrap();

    let project = Project::from_document(&doc).unwrap();
    assert_eq!(project.config_version(), Some(4));
    assert_eq!(
        project.setting("application", "config/name").and_then(Value::as_str),
        Some("Your first Godot Game")
    );
    assert_eq!(project.section("application").map(|s| s.len()), Some(2));
    assert_eq!(
        project.setting("customsection", "customfield").and_then(Value::as_int),
        Some(1337)
    );

    let jump = project.setting("input", "jump").unwrap();
    assert_eq!(jump.map_get("deadzone").and_then(Value::as_float), Some(0.5));
    assert!(project.section("rendering").is_none());
}

#[test]
fn test_project_merges_repeated_sections() {
    let doc = parse("[display]\na=1\n[display]\nb=2").unwrap();
    let err = Project::from_document(&doc).unwrap_err();
    assert!(matches!(err, TscnError::WrongFileKind { .. }));

    let doc = parse("config_version=4\n[display]\na=1\n[display]\nb=2").unwrap();
    let project = Project::from_document(&doc).unwrap();
    assert_eq!(project.sections.len(), 1);
    assert_eq!(project.section("display").map(|s| s.len()), Some(2));
}

#[test]
fn test_convert_import() {
    let doc = parse(indoc! {r#"
        [remap]
        importer="texture"
        type="StreamTexture"
        [deps]
        source_file="res://icon.png"
        [customsection]
        customfield=1337
    "#})
    .unwrap();

    let import = Import::from_document(&doc).unwrap();
    assert_eq!(import.remap.len(), 2);
    assert_eq!(import.importer(), Some("texture"));
    assert_eq!(import.remap["type"].as_str(), Some("StreamTexture"));
    assert_eq!(import.deps["source_file"].as_str(), Some("res://icon.png"));
    assert!(import.params.is_empty());
    assert_eq!(import.rest["customsection"]["customfield"].as_int(), Some(1337));
    assert_eq!(import.remap_path(), None);

    let err = Import::from_document(&parse("[gd_scene]").unwrap()).unwrap_err();
    assert!(matches!(err, TscnError::WrongFileKind { .. }));
}

#[test]
fn test_resource_id_display() {
    assert_eq!(ResourceId::from(3i64).to_string(), "3");
    assert_eq!(ResourceId::from("1_abcd").to_string(), "\"1_abcd\"");
}
