mod common;

use common::FakePlatform;
use embassy_futures::block_on;
use telepresence_motion::config::MotionConfig;
use telepresence_motion::kinematics::conversion::TargetPoint;
use telepresence_motion::kinematics::trajectory::{Trajectory, TrajectoryCache};

#[test]
fn turns_in_one_five_degree_bucket_share_a_primitive() {
    let platform = FakePlatform::new();
    let cache = TrajectoryCache::new(&MotionConfig::new());

    block_on(async {
        let ten = cache.turn(&platform, 10f32.to_radians()).await.unwrap();
        let eleven = cache.turn(&platform, 11f32.to_radians()).await.unwrap();
        let twenty = cache.turn(&platform, 20f32.to_radians()).await.unwrap();
        let back = cache.turn(&platform, -10f32.to_radians()).await.unwrap();

        assert_eq!(ten, eleven);
        assert_ne!(ten, twenty);
        assert_ne!(ten, back);
    });

    let built = platform.built_trajectories();
    assert_eq!(built.len(), 3);
    match built[0] {
        Trajectory::Turn { theta, .. } => assert!((theta - 10f32.to_radians()).abs() < 1e-4),
        other => panic!("expected a turn, got {other:?}"),
    }
}

#[test]
fn strafes_are_cached_by_exact_vector() {
    let platform = FakePlatform::new();
    let cache = TrajectoryCache::new(&MotionConfig::new());

    block_on(async {
        let first = cache
            .strafe(&platform, TargetPoint::clamped(0.5, 0.5))
            .await
            .unwrap();
        let again = cache
            .strafe(&platform, TargetPoint::clamped(0.5, 0.5))
            .await
            .unwrap();
        let other = cache
            .strafe(&platform, TargetPoint::clamped(0.5, 0.4))
            .await
            .unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(cache.forward(&platform).await, cache.forward(&platform).await);
    });

    assert_eq!(platform.built_trajectories().len(), 3);
}
