use godot_tscn::godot::{Project, ResourceId, Scene};
use godot_tscn::validate::validate_scene;
use godot_tscn::{AssembleOptions, EditableMatch, TscnError, VOLATILE_NODE_TYPE, assemble_tree_with, parse};
use indoc::indoc;

const LEVEL: &str = indoc! {r#"
    [gd_scene load_steps=4 format=2]

    [ext_resource path="res://enemies/Slime.tscn" type="PackedScene" id=1]
    [ext_resource path="res://player/Player.tscn" type="PackedScene" id=2]

    [sub_resource type="RectangleShape2D" id=1]
    extents = Vector2( 16, 4 )

    [node name="Level" type="Node2D"]

    [node name="Player" parent="." instance=ExtResource( 2 )]
    position = Vector2( 64, 128 )

    [node name="Sprite" parent="Enemies/Slime/Body" index="0"]
    modulate = Color( 1, 0, 0, 1 )

    [node name="Enemies" type="Node2D" parent="."]

    [node name="Slime" parent="Enemies" instance=ExtResource( 1 )]

    [node name="Floor" type="StaticBody2D" parent="."]

    [node name="Shape" type="CollisionShape2D" parent="Floor"]
    shape = SubResource( 1 )

    [connection signal="died" from="Player" to="." method="_on_player_died"]

    [editable path="Enemies/Slime"]
"#};

fn options() -> AssembleOptions {
    AssembleOptions::default()
}

#[test]
fn level_scene_end_to_end() {
    let doc = parse(LEVEL).unwrap();
    validate_scene(&doc).unwrap();

    let scene = Scene::from_document_with(&doc, &options()).unwrap();
    assert_eq!(scene.format, Some(2));
    assert_eq!(scene.load_steps, Some(4));
    assert_eq!(scene.ext_resources.len(), 2);
    assert_eq!(
        scene.sub_resource(1i64).map(|r| r.resource_type.as_str()),
        Some("RectangleShape2D")
    );

    let names: Vec<&str> = scene.tree.walk().map(|(_, n)| n.name.as_str()).collect();
    assert_eq!(
        names,
        ["Level", "Player", "Enemies", "Slime", "Body", "Sprite", "Floor", "Shape"]
    );

    let body = scene.node("Enemies/Slime/Body").unwrap();
    assert_eq!(body.node_type.as_deref(), Some(VOLATILE_NODE_TYPE));

    let sprite = scene.tree.get_node("Enemies/Slime/Body/Sprite").unwrap();
    assert_eq!(
        scene.tree.path_of(sprite).as_deref(),
        Some("Enemies/Slime/Body/Sprite")
    );
    assert_eq!(
        scene.tree[sprite].field("modulate").map(|v| v.to_string()),
        Some("Color (1, 0, 0, 1)".to_string())
    );

    let slime = scene.node("Enemies/Slime").unwrap();
    assert_eq!(
        scene.instance_of(slime).map(|r| r.path.as_str()),
        Some("res://enemies/Slime.tscn")
    );

    assert_eq!(scene.connections.len(), 1);
    assert_eq!(scene.connections[0].method, "_on_player_died");
    assert_eq!(scene.editables[0].path, "Enemies/Slime");
}

#[test]
fn level_scene_without_editable_is_unresolvable() {
    let text = LEVEL.replace("[editable path=\"Enemies/Slime\"]", "");
    let doc = parse(&text).unwrap();

    match assemble_tree_with(&doc, &options()).unwrap_err() {
        TscnError::UnresolvableNodeTree {
            node,
            parent_path,
            remaining,
            position,
        } => {
            assert_eq!(node, "Sprite");
            assert_eq!(parent_path, "Enemies/Slime/Body");
            assert_eq!(remaining, 1);
            assert_eq!(position.line, 14);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn string_prefix_matching_accepts_partial_names() {
    let text = LEVEL.replace("[editable path=\"Enemies/Slime\"]", "[editable path=\"Enemies/Sli\"]");
    let doc = parse(&text).unwrap();

    let segments = assemble_tree_with(&doc, &options());
    assert!(matches!(segments, Err(TscnError::UnresolvableNodeTree { .. })));

    let prefix = assemble_tree_with(
        &doc,
        &options().with_editable_match(EditableMatch::StringPrefix),
    )
    .unwrap();
    assert!(prefix.get_node("Enemies/Slime/Body/Sprite").is_some());
}

#[test]
fn scene_exports_as_json() {
    let scene = Scene::from_document_with(&parse(LEVEL).unwrap(), &options()).unwrap();
    let json = serde_json::to_value(&scene).unwrap();

    assert_eq!(json["tree"]["name"], "Level");
    assert_eq!(json["tree"]["children"][1]["children"][0]["name"], "Slime");
    assert_eq!(json["connections"][0]["signal"], "died");
    assert_eq!(
        json["sub_resources"]["1"]["fields"]["extents"],
        serde_json::json!({ "call": "Vector2", "params": [16, 4] })
    );
    assert_eq!(scene.ext_resource(ResourceId::Int(2)).map(|r| r.id.clone()), Some(ResourceId::Int(2)));
}

#[test]
fn project_settings() {
    let doc = parse(indoc! {r#"
        ; Engine configuration file.

        config_version=4

        [application]

        config/name="Platformer"
        run/main_scene="res://Level.tscn"

        [input]

        jump={
        "deadzone": 0.5,
        "events": [ Object(InputEventKey,"resource_local_to_scene":false,"scancode":32) ]
        }
    "#})
    .unwrap();
    let project = Project::from_document(&doc).unwrap();

    assert_eq!(project.config_version(), Some(4));
    assert_eq!(
        project.setting("application", "run/main_scene").and_then(|v| v.as_str()),
        Some("res://Level.tscn")
    );

    let jump = project.setting("input", "jump").unwrap();
    assert_eq!(jump.map_get("deadzone").and_then(|v| v.as_float()), Some(0.5));
    let events = jump.map_get("events").and_then(|v| v.as_array()).unwrap();
    assert_eq!(events[0].as_call().map(|c| c.name.as_str()), Some("Object"));
}
