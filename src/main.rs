//! Headless demo: an orbiting moon around a spinning planet

use scene_graph::prelude::*;

/// Shader that only counts what it is asked to bind
#[derive(Default)]
struct NullShader {
    matrices: usize,
    uniforms: usize,
}

impl Shader for NullShader {
    fn set_matrix4(&mut self, _name: &str, _value: &Mat4) {
        self.matrices += 1;
    }

    fn set_uniform_bytes(&mut self, _name: &str, _bytes: &[u8]) {
        self.uniforms += 1;
    }

    fn bind_texture(&mut self, _unit: u32, _texture: Option<TextureId>) {}
}

/// Unit cube that does nothing when drawn
struct Cube;

impl MeshSource for Cube {
    fn local_bounds(&self) -> Aabb {
        Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    fn draw(&self) {}
}

fn main() {
    env_logger::init();

    let config = SceneConfig::default().with_name("Orbit");
    let mut scene = Scene::with_config(config);
    let mut meshes = MeshLibrary::new();
    let cube = meshes.add_named("cube", Cube);

    let planet = scene.create_model("Planet");
    let moon = scene.create_model("Moon");
    for handle in [planet, moon] {
        if let Some(model) = scene.node_mut(handle).and_then(Node::as_model_mut) {
            model.add_mesh(&cube);
        }
    }
    scene.add_child(planet, moon);
    scene.set_transform(moon, Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO, Vec3::splat(0.25));

    let camera = scene.add_node(Node::camera("Camera", CameraLens::default()));
    scene.set_position(camera, Vec3::new(0.0, 3.0, 12.0));
    scene.look_at_node(camera, planet, Vec3::Y);

    let sparks = scene.add_node(Node::emitter("Sparks", 30.0));

    let mut depth = NullShader::default();
    scene.set_shader(Box::new(NullShader::default()));

    let dt = 1.0 / 60.0;
    for frame in 0..120 {
        scene.update(dt);
        scene.rotate(planet, Vec3::new(0.0, 90.0 * dt, 0.0));

        let drawn = scene.render();
        scene.render_depth(&mut depth);
        let emitted = scene.take_emissions(sparks);

        if frame % 30 == 0 {
            let moon_world = scene.world_position(moon).unwrap_or(Vec3::ZERO);
            log::info!(
                "frame {frame}: {drawn} draws, {emitted} particles, moon at ({:.2}, {:.2}, {:.2})",
                moon_world.x,
                moon_world.y,
                moon_world.z
            );
        }
    }

    let stats = scene.stats();
    log::info!(
        "{} matrices recomputed over {} passes, {} depth matrices bound",
        stats.recomputed,
        stats.full_passes,
        depth.matrices
    );
    log::debug!("depth pass uniforms: {}", depth.uniforms);
}
