use physics::{
    builtins::heron_spec, EnvRngs, Hydrodynamics, Hydrostatics, Quatf, Thrusters, VehicleState,
    Vec3f, wrench_add,
};
use sim::body::Bodies;

const DT: f32 = 1.0 / 50.0;

struct Scenario {
    bodies: Bodies,
    statics: Hydrostatics,
    drag: Hydrodynamics,
    thrusters: Thrusters,
}

fn scenario(start: VehicleState) -> Scenario {
    let mut spec = heron_spec();
    spec.hydrodynamics.randomization.enabled = false;
    spec.thrusters.randomization.enabled = false;
    let mut rngs = EnvRngs::new(1, 0);
    let statics = Hydrostatics::new(&spec.hydrostatics, 1).unwrap();
    let drag =
        Hydrodynamics::new(&spec.hydrodynamics, &spec.water_current, 1, &mut rngs).unwrap();
    let thrusters = Thrusters::new(&spec.thrusters, DT, 1, &mut rngs).unwrap();
    let mut bodies = Bodies::new(
        1,
        spec.hydrostatics.mass,
        spec.hydrostatics.gravity,
        *statics.hull(),
    );
    bodies.set_state(0, start);
    Scenario {
        bodies,
        statics,
        drag,
        thrusters,
    }
}

fn run(s: &mut Scenario, cmds: [f32; 2], ticks: usize) {
    s.thrusters.set_target(&[cmds]);
    for _ in 0..ticks {
        let hs = s.statics.update_from_states(&s.bodies.states)[0];
        let hd = s
            .drag
            .compute_hydrodynamics(&s.bodies.orientations(), &s.bodies.twists())[0];
        let th = s.thrusters.step()[0];
        let total = wrench_add(wrench_add(hs, hd), th);
        s.bodies.integrate(&[total], &[Vec3f::ZERO], &[Vec3f::ZERO], DT);
    }
}

#[test]
fn dropped_hull_settles_at_floating_height() {
    let spec = heron_spec().hydrostatics;
    let mut s = scenario(VehicleState {
        position: Vec3f::new(0.0, 0.0, spec.zero_height),
        ..Default::default()
    });
    run(&mut s, [0.0, 0.0], 1000);
    let z = s.bodies.states[0].position.z;
    let expected = s.statics.hull().equilibrium_height(spec.mass, spec.water_density);
    assert!(
        (z - expected).abs() < 5e-3,
        "hull should float at z={expected:.4}, got {z:.4}"
    );
    assert!(s.bodies.states[0].linear_velocity.length() < 1e-2);
}

#[test]
fn heeled_hull_rights_itself() {
    let mut s = scenario(VehicleState {
        position: Vec3f::new(0.0, 0.0, heron_spec_equilibrium()),
        orientation: Quatf::from_rotation_x(0.3),
        ..Default::default()
    });
    run(&mut s, [0.0, 0.0], 1500);
    let roll = physics::quat_to_euler(s.bodies.states[0].orientation).x;
    assert!(roll.abs() < 0.02, "roll should decay, got {roll}");
}

#[test]
fn equal_thrust_drives_straight_ahead() {
    let mut s = scenario(VehicleState {
        position: Vec3f::new(0.0, 0.0, heron_spec_equilibrium()),
        ..Default::default()
    });
    run(&mut s, [0.6, 0.6], 500);
    let st = s.bodies.states[0];
    assert!(st.position.x > 1.0, "should move forward, at {:?}", st.position);
    assert!(st.position.y.abs() < 1e-3, "no sideslip expected, y={}", st.position.y);
    let yaw = physics::heading_of(st.orientation);
    assert!(yaw.abs() < 1e-3, "heading drifted to {yaw}");
}

#[test]
fn differential_thrust_turns_to_starboard() {
    let mut s = scenario(VehicleState {
        position: Vec3f::new(0.0, 0.0, heron_spec_equilibrium()),
        ..Default::default()
    });
    run(&mut s, [0.6, 0.2], 200);
    assert!(s.bodies.states[0].angular_velocity.z < 0.0);
}

fn heron_spec_equilibrium() -> f32 {
    let spec = heron_spec().hydrostatics;
    physics::HullGeometry::from_spec(&spec).equilibrium_height(spec.mass, spec.water_density)
}
