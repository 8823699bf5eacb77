use physics::builtins::go_to_pose_task;
use physics::{EnvIds, EnvPhase, EnvRngs, PlanarState, Task, Vec2f};

const N: usize = 3;

fn fresh_task(seed: u64) -> (Task, EnvRngs) {
    let mut task = Task::new(go_to_pose_task(), N).unwrap();
    let mut rngs = EnvRngs::new(N, seed);
    let all = EnvIds::all(N);
    task.reset(&all);
    task.get_goals(&all, &mut rngs);
    (task, rngs)
}

fn at_goal(task: &Task) -> Vec<PlanarState> {
    task.goals()
        .iter()
        .map(|g| PlanarState {
            position: g.position,
            heading: g.heading,
            ..Default::default()
        })
        .collect()
}

#[test]
fn reward_grows_as_the_hull_closes_in() {
    let (mut task, _) = fresh_task(1);
    let mut states = at_goal(&task);
    states[0].position += Vec2f::new(3.0, 0.0);
    states[1].position += Vec2f::new(0.0, 0.5);
    let rewards = task.compute_reward(&states, &[[0.0; 2]; N], 0).to_vec();
    assert!(rewards[2] > rewards[1], "{rewards:?}");
    assert!(rewards[1] > rewards[0], "{rewards:?}");
    // Exponential primary plus weighted heading term, nothing to penalise.
    assert!((rewards[2] - 1.5).abs() < 1e-5, "{rewards:?}");
}

#[test]
fn holding_the_pose_ends_the_episode() {
    let (mut task, _) = fresh_task(2);
    let n = go_to_pose_task().kill_after_n_steps_in_tolerance;
    let states = at_goal(&task);
    for step in 0..n {
        task.compute_reward(&states, &[[0.0; 2]; N], step as u64);
        assert!(
            task.update_kills().iter().all(|k| !k),
            "killed early at step {step}"
        );
    }
    task.compute_reward(&states, &[[0.0; 2]; N], n as u64);
    assert!(task.update_kills().iter().all(|k| *k));
    assert!(task.phases().iter().all(|p| *p == EnvPhase::Terminated));

    task.reset(&EnvIds::new([1], N));
    assert_eq!(task.phases()[1], EnvPhase::Active);
    assert_eq!(task.phases()[0], EnvPhase::Terminated);
    assert_eq!(task.goal_reached()[1], 0);
}

#[test]
fn leaving_the_tolerance_restarts_the_streak() {
    let (mut task, _) = fresh_task(3);
    let mut states = at_goal(&task);
    for step in 0..10 {
        task.compute_reward(&states, &[[0.0; 2]; N], step);
    }
    assert!(task.goal_reached().iter().all(|c| *c == 10));
    states[0].position += Vec2f::new(1.0, 0.0);
    task.compute_reward(&states, &[[0.0; 2]; N], 10);
    assert_eq!(task.goal_reached(), &[0, 11, 11]);
}

#[test]
fn drifting_away_kills_only_that_env() {
    let (mut task, _) = fresh_task(4);
    let mut states = at_goal(&task);
    states[2].position += Vec2f::new(0.0, go_to_pose_task().kill_dist + 0.1);
    task.compute_reward(&states, &[[0.0; 2]; N], 0);
    assert_eq!(task.update_kills(), &[false, false, true]);
}

#[test]
fn spawn_radius_follows_the_curriculum() {
    let spec = go_to_pose_task();
    let (mut task, mut rngs) = fresh_task(5);
    let all = EnvIds::all(N);
    let dist = |task: &Task, spawns: &[(usize, PlanarState)]| -> Vec<f32> {
        spawns
            .iter()
            .map(|(id, s)| (s.position - task.goals()[*id].position).length())
            .collect()
    };

    let first = task.get_spawns(&all, 0, &mut rngs);
    for d in dist(&task, &first) {
        assert!((d - spec.spawn.min_distance).abs() < 1e-4, "step 0 spawned at {d}");
    }
    let max_speed = spec.spawn.max_spawn_speed;
    for (_, s) in &first {
        let v = s.linear_velocity;
        assert!(v.x.abs() <= max_speed && v.y.abs() <= max_speed, "spawn velocity {v:?}");
    }

    let mut widest = 0.0f32;
    for _ in 0..50 {
        let late = task.get_spawns(&all, 10_000, &mut rngs);
        for d in dist(&task, &late) {
            assert!(d >= spec.spawn.min_distance - 1e-4 && d <= spec.spawn.max_distance + 1e-4);
            widest = widest.max(d);
        }
    }
    assert!(widest > 0.5 * spec.spawn.max_distance, "widest spawn {widest}");
}
