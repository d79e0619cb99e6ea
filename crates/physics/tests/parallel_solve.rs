use std::thread;

use physics::{
    BodySet, BodyType, ContactConstraint, ContactPoint, Material, RigidBody, Shape, Vec3, World, WorldConfig,
};

fn ball(x: f32) -> RigidBody {
    RigidBody::new(BodyType::Dynamic, Shape::Sphere { radius: 1.0 }, Material::default())
        .with_mass(1.0)
        .with_position(Vec3::new(x, 0.0, 0.0))
}

#[test]
fn opposite_lock_orders_do_not_deadlock() {
    let mut set = BodySet::new();
    set.insert(ball(0.0));
    set.insert(ball(1.5));

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..20_000 {
                let (mut a, _b) = set.lock_pair(0, 1).unwrap();
                a.sleep_timer += 1.0;
            }
        });
        s.spawn(|| {
            for _ in 0..20_000 {
                let (mut b, _a) = set.lock_pair(1, 0).unwrap();
                b.sleep_timer += 1.0;
            }
        });
    });

    assert_eq!(set.get(0).unwrap().lock().sleep_timer, 20_000.0);
    assert_eq!(set.get(1).unwrap().lock().sleep_timer, 20_000.0);
}

#[test]
fn swapped_constraints_solve_concurrently() {
    let mut set = BodySet::new();
    set.insert(ball(0.0));
    set.insert(ball(1.5));
    let pool = compute::WorkerPool::new(4).unwrap();

    let constraints: Vec<ContactConstraint> = (0..2_000)
        .map(|i| {
            let (a, b, n) = if i % 2 == 0 { (0, 1, Vec3::X) } else { (1, 0, Vec3::NEG_X) };
            ContactConstraint::new(a, b, n).with_point(ContactPoint::new(Vec3::new(0.75, 0.0, 0.0), 1e-4))
        })
        .collect();

    pool.for_each(&constraints, |c| {
        c.solve_position(&set, 0.001);
        c.solve_velocity(&set, 0.001);
    });

    let a = set.get(0).unwrap().lock().position.x;
    let b = set.get(1).unwrap().lock().position.x;
    assert!(b - a > 1.5);
}

fn drop_grid(workers: usize) -> Vec<Vec3> {
    let mut world = World::new(WorldConfig {
        workers,
        ..WorldConfig::default()
    })
    .unwrap();
    world.add_ground(0.0, Material::default());
    let ids: Vec<_> = (0..6)
        .flat_map(|i| (0..6).map(move |j| (i, j)))
        .map(|(i, j)| {
            let p = Vec3::new(i as f32 * 1.5, 1.0 + 0.1 * (i + j) as f32, j as f32 * 1.5);
            world.add_sphere(p, 0.5, Material::bouncy())
        })
        .collect();
    world.run(1.0 / 60.0, 90);
    ids.iter().map(|&id| world.body(id).unwrap().position).collect()
}

#[test]
fn worker_count_does_not_change_independent_bodies() {
    let sequential = drop_grid(1);
    let parallel = drop_grid(4);
    for (s, p) in sequential.iter().zip(&parallel) {
        assert!((*s - *p).length() < 1e-5, "{s} vs {p}");
    }
}
