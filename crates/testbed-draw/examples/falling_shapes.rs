//! Falling shapes demo.
//!
//! Drops a stack of boxes and balls onto static ground with rapier2d and
//! draws every collider through the debug draw facade: solid polygons and
//! circles colored by body state, body transforms, collider AABBs, contact
//! points and a status line.
//!
//! Run with: `cargo run -p testbed-draw --example falling_shapes --features renderer`
//!
//! Controls: mouse wheel zooms, arrow keys pan, Home resets the view,
//! Escape quits.

use rapier2d::prelude::*;
use testbed_draw::geometry::Aabb;
use testbed_draw::prelude::*;

const STATIC_COLOR: Color = Color::rgb(0.5, 0.9, 0.5);
const AWAKE_COLOR: Color = Color::rgb(0.9, 0.7, 0.7);
const SLEEPING_COLOR: Color = Color::rgb(0.6, 0.6, 0.6);
const AABB_COLOR: Color = Color::rgb(0.9, 0.3, 0.9);
const CONTACT_COLOR: Color = Color::rgb(0.3, 0.95, 0.3);
const CONTROLS_HINT: &str = "wheel: zoom  arrows: pan  home: reset";

struct FallingShapes {
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    steps: u64,
}

impl FallingShapes {
    fn new() -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        let ground = bodies.insert(RigidBodyBuilder::fixed().build());
        colliders.insert_with_parent(
            ColliderBuilder::cuboid(40.0, 0.5).build(),
            ground,
            &mut bodies,
        );

        // A pyramid of boxes with a ball above every column.
        const ROWS: usize = 10;
        for row in 0..ROWS {
            let y = 0.5 + 1.05 * (row as Real + 0.5);
            for col in 0..(ROWS - row) {
                let x = (col as Real - (ROWS - row) as Real * 0.5) * 1.1;
                let body = bodies.insert(
                    RigidBodyBuilder::dynamic()
                        .translation(vector![x, y])
                        .build(),
                );
                colliders.insert_with_parent(
                    ColliderBuilder::cuboid(0.5, 0.5).friction(0.6).build(),
                    body,
                    &mut bodies,
                );
            }
        }
        for col in 0..ROWS {
            let x = (col as Real - ROWS as Real * 0.5) * 1.1;
            let body = bodies.insert(
                RigidBodyBuilder::dynamic()
                    .translation(vector![x, 20.0 + col as Real])
                    .rotation(0.3 * col as Real)
                    .build(),
            );
            colliders.insert_with_parent(
                ColliderBuilder::ball(0.45).restitution(0.3).build(),
                body,
                &mut bodies,
            );
        }

        Self {
            gravity: vector![0.0, -10.0],
            integration_params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            steps: 0,
        }
    }

    fn body_color(&self, collider: &Collider) -> Color {
        let Some(body) = collider.parent().and_then(|h| self.bodies.get(h)) else {
            return STATIC_COLOR;
        };
        if !body.is_dynamic() {
            STATIC_COLOR
        } else if body.is_sleeping() {
            SLEEPING_COLOR
        } else {
            AWAKE_COLOR
        }
    }
}

fn to_vec2(p: &Point<Real>) -> Vec2 {
    Vec2::new(p.x, p.y)
}

fn to_transform(pos: &Isometry<Real>) -> Transform {
    Transform::new(
        Vec2::new(pos.translation.vector.x, pos.translation.vector.y),
        Rot::from_angle(pos.rotation.angle()),
    )
}

impl Scene for FallingShapes {
    fn title(&self) -> &str {
        "Falling Shapes"
    }

    fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.steps += 1;
    }

    fn draw(&self, frame: &mut DebugFrame<'_, WgpuContext>) {
        for (_, collider) in self.colliders.iter() {
            let pos = collider.position();
            let color = self.body_color(collider);
            let xf = to_transform(pos);

            if let Some(cuboid) = collider.shape().as_cuboid() {
                let h = cuboid.half_extents;
                let corners = [
                    point![-h.x, -h.y],
                    point![h.x, -h.y],
                    point![h.x, h.y],
                    point![-h.x, h.y],
                ]
                .map(|c| to_vec2(&(pos * c)));
                frame.draw_solid_polygon(&corners, color);
            } else if let Some(ball) = collider.shape().as_ball() {
                frame.draw_solid_circle(xf.p, ball.radius, xf.q.x_axis(), color);
            }

            frame.draw_transform(xf);

            let aabb = collider.compute_aabb();
            frame.draw_aabb(
                Aabb::new(to_vec2(&aabb.mins), to_vec2(&aabb.maxs)),
                AABB_COLOR,
            );
        }

        let mut contacts = 0usize;
        for pair in self.narrow_phase.contact_pairs() {
            for manifold in &pair.manifolds {
                for contact in &manifold.data.solver_contacts {
                    frame.draw_point(to_vec2(&contact.point), 5.0, CONTACT_COLOR);
                    contacts += 1;
                }
            }
        }

        frame.draw_string(
            Vec2::new(5.0, 15.0),
            format_args!(
                "bodies {} contacts {} step {}",
                self.bodies.len(),
                contacts,
                self.steps
            ),
        );
        frame.draw_string_world(Vec2::new(-4.0, -2.0), "ground");

        let size = frame.text_size(CONTROLS_HINT);
        let right = frame.camera().width as f32 - 5.0;
        frame.draw_string(Vec2::new(right - size.x, 15.0), CONTROLS_HINT);
    }
}

fn main() -> anyhow::Result<()> {
    run_windowed(FallingShapes::new(), TestbedConfig::default())
}
