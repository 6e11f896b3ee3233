//! The sun and its secondary layers.

use corona_config::{SunConfig, hex_to_rgb};
use corona_mesh::sphere_geometry;
use corona_scene::{
    LayerUniforms, Mesh, Node, NodeId, SceneError, SceneGraph, ShaderMaterial, ShaderProgram,
    Side, Transform,
};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::loops::LoopShape;

/// Builds the sun layers into a scene and keeps them animated.
///
/// The controller only holds [`NodeId`] handles; the scene owns the nodes.
/// Every corona shell, loop and halo is tracked as a secondary layer that
/// receives the per-frame `time` and a slow drift about Y.
pub struct SunEffects {
    config: SunConfig,
    rng: ChaCha8Rng,
    seed: u64,
    exposure: f32,
    sun: Option<NodeId>,
    layers: Vec<NodeId>,
}

impl SunEffects {
    pub fn new(config: SunConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        log::info!("Sun effects seed: {seed}");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            exposure: config.exposure,
            config,
            sun: None,
            layers: Vec::new(),
        }
    }

    /// Seed the loop placement was drawn from. Pass it back through
    /// `SunConfig::seed` to reproduce the same loops.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn sun(&self) -> Option<NodeId> {
        self.sun
    }

    /// Corona shells, loops and halo, in creation order.
    pub fn layers(&self) -> &[NodeId] {
        &self.layers
    }

    fn base_uniforms(&self) -> LayerUniforms {
        LayerUniforms {
            exposure: self.exposure,
            ..LayerUniforms::default()
        }
    }

    /// Insert the photosphere as a detached node and remember it as the sun.
    pub fn create_realistic_sun(&mut self, scene: &mut SceneGraph) -> NodeId {
        let geometry = sphere_geometry(
            self.config.radius,
            self.config.segments,
            self.config.segments,
        );
        let material = ShaderMaterial::opaque(ShaderProgram::Photosphere, self.base_uniforms());
        let id = scene.insert(Node::mesh("sun", Mesh::new(geometry, material)));
        self.sun = Some(id);
        log::debug!(
            "Photosphere {id}: radius {}, {} segments",
            self.config.radius,
            self.config.segments
        );
        id
    }

    /// Insert a detached group at `sun_position` holding one additive shell
    /// per configured corona layer.
    pub fn create_corona_layers(
        &mut self,
        scene: &mut SceneGraph,
        sun_position: Vec3,
    ) -> Result<NodeId, SceneError> {
        let group =
            scene.insert(Node::group("corona").with_transform(Transform::from_position(sun_position)));
        let segments = self.config.corona_segments;

        for (index, layer) in self.config.corona_layers.iter().enumerate() {
            let uniforms = LayerUniforms {
                color_inner: hex_to_rgb(layer.color_inner),
                color_outer: hex_to_rgb(layer.color_outer),
                intensity: layer.intensity,
                ..self.base_uniforms()
            };
            let material = ShaderMaterial::additive(ShaderProgram::Corona, uniforms, Side::Back);
            let mesh = Mesh::new(sphere_geometry(layer.radius, segments, segments), material);
            let id = scene.add_child(group, Node::mesh(format!("corona_{index}"), mesh))?;
            self.layers.push(id);
        }

        Ok(group)
    }

    /// Insert a detached flare group at `sun_position` filled with coronal
    /// loops.
    pub fn create_solar_flares(
        &mut self,
        scene: &mut SceneGraph,
        sun_position: Vec3,
    ) -> Result<NodeId, SceneError> {
        let group =
            scene.insert(Node::group("flares").with_transform(Transform::from_position(sun_position)));
        self.create_coronal_loops(scene, group)?;
        Ok(group)
    }

    /// Add the configured number of loops under `group`, each anchored at a
    /// random point of the photosphere.
    pub fn create_coronal_loops(
        &mut self,
        scene: &mut SceneGraph,
        group: NodeId,
    ) -> Result<(), SceneError> {
        let count = self.config.loops.count;
        for index in 0..count {
            let shape = LoopShape::sample(&mut self.rng, &self.config.loops);
            let uniforms = LayerUniforms {
                seed: shape.seed,
                ..self.base_uniforms()
            };
            let material =
                ShaderMaterial::additive(ShaderProgram::CoronalLoop, uniforms, Side::Double);
            let node = Node::mesh(
                format!("coronal_loop_{index}"),
                Mesh::new(shape.geometry(&self.config.loops), material),
            )
            .with_transform(shape.transform(self.config.radius));

            let id = scene.add_child(group, node)?;
            self.layers.push(id);
        }

        log::info!("Created {count} coronal loops");
        Ok(())
    }

    /// Insert the detached heat halo at `sun_position`.
    pub fn create_heat_halo(&mut self, scene: &mut SceneGraph, sun_position: Vec3) -> NodeId {
        let segments = self.config.halo_segments;
        let material =
            ShaderMaterial::additive(ShaderProgram::HeatHalo, self.base_uniforms(), Side::Back);
        let mesh = Mesh::new(
            sphere_geometry(self.config.halo_radius, segments, segments),
            material,
        );
        let id = scene.insert(
            Node::mesh("heat_halo", mesh).with_transform(Transform::from_position(sun_position)),
        );
        self.layers.push(id);
        id
    }

    /// Build every layer and register the sun, corona group, flare group and
    /// halo as scene roots, in that order. Returns the sun.
    pub fn init_sun_effects(&mut self, scene: &mut SceneGraph) -> Result<NodeId, SceneError> {
        let sun = self.create_realistic_sun(scene);
        let sun_position = scene
            .node(sun)
            .map(|node| node.transform.position)
            .unwrap_or(Vec3::ZERO);

        let corona = self.create_corona_layers(scene, sun_position)?;
        let flares = self.create_solar_flares(scene, sun_position)?;
        let halo = self.create_heat_halo(scene, sun_position);

        for root in [sun, corona, flares, halo] {
            scene.attach_root(root)?;
        }

        log::info!(
            "Sun effects ready: {} layers at exposure {}",
            self.layers.len(),
            self.exposure
        );
        Ok(sun)
    }

    /// Advance every `time` uniform and apply the rotational drift.
    ///
    /// Nothing happens for the sun before it exists; handles the scene does
    /// not know are skipped.
    pub fn update(&self, scene: &mut SceneGraph, time: f32) {
        if let Some(sun) = self.sun.and_then(|id| scene.node_mut(id))
            && let Some(material) = sun.material_mut()
        {
            material.uniforms.time = time;
        }

        for &id in &self.layers {
            let Some(node) = scene.node_mut(id) else {
                continue;
            };
            if let Some(material) = node.material_mut() {
                material.uniforms.time = time;
            }
            node.transform.rotation.y += self.config.layer_drift_per_update;
        }

        if let Some(sun) = self.sun.and_then(|id| scene.node_mut(id)) {
            sun.transform.rotation.y += self.config.spin_per_update;
        }
    }

    /// Store `value` and push it into the sun and every layer material.
    /// Layers created later start at this exposure.
    pub fn set_exposure(&mut self, scene: &mut SceneGraph, value: f32) {
        self.exposure = value;

        for id in self.sun.iter().chain(&self.layers) {
            if let Some(material) = scene.node_mut(*id).and_then(Node::material_mut) {
                material.uniforms.exposure = value;
            }
        }
        log::debug!("Exposure set to {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corona_scene::{Blending, NodeKind};

    fn seeded(seed: u64) -> SunEffects {
        SunEffects::new(SunConfig {
            seed: Some(seed),
            ..SunConfig::default()
        })
    }

    fn material(scene: &SceneGraph, id: NodeId) -> &ShaderMaterial {
        &scene.node(id).unwrap().as_mesh().unwrap().material
    }

    #[test]
    fn test_new_takes_config_exposure() {
        let effects = SunEffects::new(SunConfig {
            exposure: 1.7,
            seed: Some(1),
            ..SunConfig::default()
        });
        assert_eq!(effects.exposure(), 1.7);
        assert_eq!(effects.seed(), 1);
        assert!(effects.sun().is_none());
        assert!(effects.layers().is_empty());
    }

    #[test]
    fn test_sun_is_opaque_photosphere() {
        let mut scene = SceneGraph::new();
        let mut effects = seeded(1);
        let sun = effects.create_realistic_sun(&mut scene);

        assert_eq!(effects.sun(), Some(sun));
        assert!(!scene.is_attached(sun));
        let node = scene.node(sun).unwrap();
        let mesh = node.as_mesh().unwrap();
        assert_eq!(mesh.material.program, ShaderProgram::Photosphere);
        assert!(!mesh.material.transparent);
        assert_eq!(mesh.geometry.vertex_count(), 97 * 97);
        assert!((mesh.geometry.bounding_radius() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_corona_layers_match_table() {
        let mut scene = SceneGraph::new();
        let mut effects = seeded(1);
        let position = Vec3::new(1.0, 2.0, 3.0);
        let group = effects.create_corona_layers(&mut scene, position).unwrap();

        let group_node = scene.node(group).unwrap();
        assert!(matches!(group_node.kind, NodeKind::Group));
        assert_eq!(group_node.transform.position, position);
        assert_eq!(group_node.children(), effects.layers());

        let expected = [
            (12.3, 0xffd966, 0xff9933, 0.35),
            (12.7, 0xff9933, 0xff6600, 0.25),
            (13.0, 0xff6600, 0xff4400, 0.15),
        ];
        for (&id, (radius, inner, outer, intensity)) in effects.layers().iter().zip(expected) {
            let mesh = scene.node(id).unwrap().as_mesh().unwrap();
            let m = &mesh.material;
            assert_eq!(m.program, ShaderProgram::Corona);
            assert_eq!(m.blending, Blending::Additive);
            assert_eq!(m.side, Side::Back);
            assert!(m.transparent && !m.depth_write);
            assert_eq!(m.uniforms.color_inner, hex_to_rgb(inner));
            assert_eq!(m.uniforms.color_outer, hex_to_rgb(outer));
            assert_eq!(m.uniforms.intensity, intensity);
            assert!((mesh.geometry.bounding_radius() - radius).abs() < 1e-4);
            assert_eq!(mesh.geometry.vertex_count(), 65 * 65);
        }
    }

    #[test]
    fn test_flares_hold_configured_loop_count() {
        let mut scene = SceneGraph::new();
        let mut effects = seeded(5);
        let group = effects.create_solar_flares(&mut scene, Vec3::ZERO).unwrap();

        let loops = scene.node(group).unwrap().children().to_vec();
        assert_eq!(loops.len(), 35);
        assert_eq!(loops, effects.layers());
        for id in loops {
            let m = material(&scene, id);
            assert_eq!(m.program, ShaderProgram::CoronalLoop);
            assert_eq!(m.side, Side::Double);
            assert!((0.0..1000.0).contains(&m.uniforms.seed));
        }
    }

    #[test]
    fn test_halo_is_back_side_additive() {
        let mut scene = SceneGraph::new();
        let mut effects = seeded(1);
        let halo = effects.create_heat_halo(&mut scene, Vec3::ZERO);
        assert_eq!(effects.layers(), &[halo]);
        let m = material(&scene, halo);
        assert_eq!(m.program, ShaderProgram::HeatHalo);
        assert_eq!(m.side, Side::Back);
        assert_eq!(m.blending, Blending::Additive);
    }

    #[test]
    fn test_update_before_init_is_noop() {
        let mut scene = SceneGraph::new();
        let effects = seeded(1);
        effects.update(&mut scene, 4.0);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_update_sets_time_and_drifts() {
        let mut scene = SceneGraph::new();
        let mut effects = seeded(2);
        let sun = effects.init_sun_effects(&mut scene).unwrap();
        let halo = *effects.layers().last().unwrap();

        for step in 1..=10 {
            effects.update(&mut scene, step as f32 * 0.5);
        }

        assert_eq!(material(&scene, sun).uniforms.time, 5.0);
        assert!((scene.node(sun).unwrap().transform.rotation.y - 0.01).abs() < 1e-6);
        assert_eq!(material(&scene, halo).uniforms.time, 5.0);
        assert!((scene.node(halo).unwrap().transform.rotation.y - 0.006).abs() < 1e-6);
    }

    #[test]
    fn test_update_skips_stale_handles() {
        let mut scene = SceneGraph::new();
        let mut effects = seeded(2);
        effects.init_sun_effects(&mut scene).unwrap();

        // A fresh scene does not know any of these handles.
        let mut other = SceneGraph::new();
        effects.update(&mut other, 1.0);
        assert!(other.is_empty());
    }

    #[test]
    fn test_set_exposure_before_creation_applies_to_new_layers() {
        let mut scene = SceneGraph::new();
        let mut effects = seeded(3);
        effects.set_exposure(&mut scene, 0.4);
        let sun = effects.init_sun_effects(&mut scene).unwrap();

        assert_eq!(material(&scene, sun).uniforms.exposure, 0.4);
        for &id in effects.layers() {
            assert_eq!(material(&scene, id).uniforms.exposure, 0.4);
        }
    }

    #[test]
    fn test_same_seed_same_loops() {
        let build = |seed| {
            let mut scene = SceneGraph::new();
            let mut effects = seeded(seed);
            effects.init_sun_effects(&mut scene).unwrap();
            effects
                .layers()
                .iter()
                .map(|&id| {
                    let node = scene.node(id).unwrap();
                    (node.transform, node.as_mesh().unwrap().material.uniforms.seed)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(build(42), build(42));
        assert_ne!(build(42), build(43));
    }
}
