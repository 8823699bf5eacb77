use crate::disturbances::{
    ActionNoiseSpec, DisturbanceSpec, DisturbancesSpec, Dimensionality, MassSpec,
    ObservationNoiseSpec, SinusoidSpec,
};
use crate::spec::{
    DragRandomizationSpec, HydrodynamicsSpec, HydrostaticsSpec, InterpolationSpec,
    LeastSquaresSpec, ThrusterRandomizationSpec, ThrusterSpec, VesselSpec, WaterCurrentSpec,
};
use crate::task::{
    ObservationFrame, PenaltiesSpec, RewardMode, RewardSpec, SpawnSpec, TaskGoalSpec, TaskSpec,
};

/// Heron-class twin-hull surface vessel, SI units.
pub fn heron_spec() -> VesselSpec {
    let mass = 38.0; // kg, hull plus battery
    let water_density = 1000.0;
    let gravity = -9.81;
    VesselSpec {
        hydrostatics: HydrostaticsSpec {
            water_density,
            gravity,
            // ~ m * |g|, keeps the righting torque independent of the tick rate
            average_hydrostatics_force_value: 372.0,
            amplify_torque: 1.0,
            box_width: 1.0,
            box_length: 1.3,
            waterplane_area: 0.33,
            zero_height: 0.2,
            max_draft: 20.0,
            mass,
            metacentric_width: None,
            metacentric_length: None,
            rotate_torque_to_body: false,
        },
        hydrodynamics: HydrodynamicsSpec {
            linear_damping: [16.45, 15.80, 100.0, 13.0, 13.0, 6.0],
            quadratic_damping: [2.94, 2.76, 10.0, 5.0, 5.0, 5.0],
            linear_damping_forward_speed: [0.0; 6],
            offset_linear_damping: 0.0,
            offset_lin_forward_damping_speed: 0.0,
            offset_nonlin_damping: 0.0,
            scaling_damping: 1.0,
            randomization: DragRandomizationSpec {
                enabled: true,
                linear: [0.1, 0.1, 0.0, 0.0, 0.0, 0.1],
                quadratic: [0.1, 0.1, 0.0, 0.0, 0.0, 0.1],
            },
        },
        thrusters: ThrusterSpec {
            time_constant: 0.05,
            cmd_lower_range: -1.0,
            cmd_upper_range: 1.0,
            deadband: [-0.05, 0.05],
            interpolation: InterpolationSpec {
                points_for_interpolation: 1000,
                // Bench measurements (command, N)
                left: vec![
                    [-0.9, -9.74],
                    [-0.8, -7.86],
                    [-0.7, -5.50],
                    [-0.6, -3.25],
                    [-0.5, -1.53],
                    [-0.4, -0.51],
                    [-0.3, -0.25],
                    [-0.2, -0.12],
                    [-0.1, -0.03],
                ],
                right: vec![
                    [0.1, 0.05],
                    [0.2, 0.35],
                    [0.3, 0.88],
                    [0.4, 3.70],
                    [0.5, 8.76],
                    [0.6, 15.90],
                    [0.7, 24.54],
                    [0.8, 33.58],
                    [0.9, 41.48],
                ],
            },
            least_squares: LeastSquaresSpec {
                neg_cmd_coeff: vec![88.610_14, 163.995_45, 76.816_42, 11.947_696, 0.203_746],
                pos_cmd_coeff: vec![-197.8007, 334.0507, -97.619_79, 7.593_413, -0.030_185],
            },
            positions: [[-0.4, 0.37, 0.0], [-0.4, -0.37, 0.0]],
            split_thrust: false,
            randomization: ThrusterRandomizationSpec {
                enabled: true,
                left_gain: 0.05,
                right_gain: 0.05,
                time_constant: 0.1,
            },
        },
        water_current: WaterCurrentSpec::default(),
    }
}

/// Disturbances used for training runs on the planar tasks.
pub fn default_disturbances() -> DisturbancesSpec {
    DisturbancesSpec {
        dimensionality: Dimensionality::Planar,
        forces: DisturbanceSpec {
            enabled: true,
            min_magnitude: 0.0,
            max_magnitude: 0.5,
            sinusoid: None,
        },
        torques: DisturbanceSpec {
            enabled: true,
            min_magnitude: 0.0,
            max_magnitude: 0.1,
            sinusoid: Some(SinusoidSpec {
                min_freq: 0.25,
                max_freq: 3.0,
                min_offset: -std::f32::consts::PI,
                max_offset: std::f32::consts::PI,
            }),
        },
        observations: ObservationNoiseSpec {
            position: 0.01,
            velocity: 0.01,
            heading: 0.005,
        },
        actions: ActionNoiseSpec { amplitude: 0.02 },
        mass: MassSpec {
            enabled: true,
            base_mass: 38.0,
            min_mass: 34.0,
            max_mass: 42.0,
            max_com_displacement: 0.05,
        },
    }
}

pub fn go_to_pose_task() -> TaskSpec {
    TaskSpec {
        goal: TaskGoalSpec::GoToPose {
            position_tolerance: 0.1,
            heading_tolerance: 0.05,
            goal_random_position: 0.0,
        },
        kill_dist: 8.0,
        kill_after_n_steps_in_tolerance: 50,
        observation_frame: ObservationFrame::Local,
        spawn: SpawnSpec {
            min_distance: 0.5,
            max_distance: 5.0,
            curriculum_steps: Some(250.0),
            max_spawn_speed: 1.5,
        },
        reward: RewardSpec {
            mode: RewardMode::Exponential,
            exponential_reward_coeff: 0.25,
            heading_weight: 0.5,
            angular_velocity_weight: 1.0,
        },
        penalties: PenaltiesSpec {
            linear_velocity_weight: 0.0,
            angular_velocity_weight: 0.05,
            action_weight: 0.01,
            curriculum_steps: Some(500.0),
        },
    }
}

pub fn track_xyo_velocity_task() -> TaskSpec {
    TaskSpec {
        goal: TaskGoalSpec::TrackXyoVelocity {
            lin_vel_tolerance: 0.01,
            ang_vel_tolerance: 0.025,
            goal_random_linear_velocity: 0.75,
            goal_random_angular_velocity: 0.3,
        },
        kill_dist: 500.0,
        kill_after_n_steps_in_tolerance: 500,
        observation_frame: ObservationFrame::Global,
        spawn: SpawnSpec {
            min_distance: 0.0,
            max_distance: 0.0,
            curriculum_steps: None,
            max_spawn_speed: 1.5,
        },
        reward: RewardSpec {
            mode: RewardMode::Exponential,
            exponential_reward_coeff: 0.25,
            heading_weight: 1.0,
            angular_velocity_weight: 1.0,
        },
        penalties: PenaltiesSpec::default(),
    }
}
