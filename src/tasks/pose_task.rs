//! Pose lane.
//!
//! Plays queued pose animations strictly in order; a pose change is never cancelled by a
//! newer one, it is chained behind it. Once an animation lands the controller updates the
//! awkward-pose watchdog and runs the request's follow-up.
use log::{debug, info, warn};

use crate::controller::MotionController;
use crate::robot::platform::{ActionSpec, Platform};

pub async fn pose_task<P: Platform>(ctl: &MotionController<P>) {
    loop {
        let Some(request) = ctl.with_state(|s| s.pose_queue.pop_front()) else {
            ctl.pose_queued.wait().await;
            continue;
        };

        if let Some(pose) = request.target {
            info!("[POSE_TASK] taking pose {pose}");
            match ctl.ladder.action_for(&ctl.platform, pose).await {
                Ok(animation) => {
                    match ctl
                        .platform
                        .run_action(ActionSpec::Animate { pose, animation })
                        .await
                    {
                        Ok(()) => debug!("[POSE_TASK] pose {pose} reached"),
                        Err(e) => warn!("[POSE_TASK] pose {pose} animation: {e}"),
                    }
                }
                Err(e) => warn!("[POSE_TASK] no animation for {pose}: {e}"),
            }
            ctl.pose_landed(pose);
        }

        if let Some(follow_up) = request.then {
            ctl.follow_up(follow_up);
        }
    }
}
