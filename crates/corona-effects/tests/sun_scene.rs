//! End-to-end checks of a fully initialized sun scene.

use corona_config::{Config, SunConfig};
use corona_effects::SunEffects;
use corona_scene::{NodeKind, SceneGraph, ShaderProgram};
use glam::Vec3;

fn init(config: SunConfig) -> (SceneGraph, SunEffects) {
    let mut scene = SceneGraph::new();
    let mut effects = SunEffects::new(config);
    effects.init_sun_effects(&mut scene).unwrap();
    (scene, effects)
}

fn seeded() -> SunConfig {
    SunConfig {
        seed: Some(2024),
        ..SunConfig::default()
    }
}

#[test]
fn registers_four_roots_in_order() {
    let (scene, effects) = init(seeded());
    let roots = scene.roots();
    assert_eq!(roots.len(), 4);
    assert_eq!(Some(roots[0]), effects.sun());

    let names: Vec<_> = roots
        .iter()
        .map(|&id| scene.node(id).unwrap().name.as_str())
        .collect();
    assert_eq!(names, ["sun", "corona", "flares", "heat_halo"]);
}

#[test]
fn tracks_every_secondary_layer() {
    let (scene, effects) = init(seeded());
    assert_eq!(effects.layers().len(), 3 + 35 + 1);
    assert!(effects.layers().iter().all(|&id| scene.is_attached(id)));
    assert!(!effects.layers().contains(&effects.sun().unwrap()));

    let drawn = scene.meshes().count();
    assert_eq!(drawn, 1 + effects.layers().len());
}

#[test]
fn every_material_shares_exposure() {
    let (mut scene, mut effects) = init(SunConfig {
        exposure: 1.3,
        ..seeded()
    });
    assert!(scene.meshes().all(|(_, mesh, _)| mesh.material.uniforms.exposure == 1.3));

    effects.set_exposure(&mut scene, 0.25);
    assert_eq!(effects.exposure(), 0.25);
    assert!(scene.meshes().all(|(_, mesh, _)| mesh.material.uniforms.exposure == 0.25));
}

#[test]
fn update_reaches_every_drawn_mesh() {
    let (mut scene, effects) = init(seeded());
    effects.update(&mut scene, 12.5);
    assert!(scene.meshes().all(|(_, mesh, _)| mesh.material.uniforms.time == 12.5));
}

#[test]
fn loops_sit_on_the_photosphere() {
    let (scene, _) = init(seeded());
    let flares = scene.roots()[2];
    let loops = scene.node(flares).unwrap().children();
    assert_eq!(loops.len(), 35);

    for &id in loops {
        let world = scene.world_matrix(id).unwrap();
        let anchor = world.transform_point3(Vec3::ZERO);
        assert!((anchor.length() - 12.0).abs() < 1e-3);

        let mesh = scene.node(id).unwrap().as_mesh().unwrap();
        assert_eq!(mesh.material.program, ShaderProgram::CoronalLoop);

        // The arch never reaches farther from its anchor than its larger
        // half-extent plus the tube radius.
        for p in &mesh.geometry.positions {
            let reach = world.transform_point3(*p).distance(anchor);
            assert!(reach < 2.3 + 0.05, "loop vertex {reach} from its anchor");
        }
    }
}

#[test]
fn layer_drift_does_not_move_the_sun_position() {
    let (mut scene, effects) = init(seeded());
    for step in 0..600 {
        effects.update(&mut scene, step as f32 / 60.0);
    }
    for &root in scene.roots() {
        let node = scene.node(root).unwrap();
        assert_eq!(node.transform.position, Vec3::ZERO);
        if matches!(node.kind, NodeKind::Mesh(_)) && Some(root) == effects.sun() {
            assert!((node.transform.rotation.y - 0.6).abs() < 1e-3);
        }
    }
}

#[test]
fn loop_count_follows_config() {
    let mut config = Config::default();
    config.sun.seed = Some(9);
    config.sun.loops.count = 5;
    let (scene, effects) = init(config.sun);
    assert_eq!(effects.layers().len(), 3 + 5 + 1);
    assert_eq!(scene.node(scene.roots()[2]).unwrap().children().len(), 5);
}
