//! Scheduler which owns one framework per profile and routes pods to them by scheduler name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::KubeSchedulerConfiguration;
use crate::core::pod::Pod;
use crate::core::scheduler::context::Context;
use crate::core::scheduler::framework::{Framework, ScheduleResult};
use crate::core::scheduler::handle::FrameworkHandle;
use crate::core::scheduler::interface::{ConstructionError, PodSchedulingAlgorithm, ScheduleError};
use crate::core::scheduler::registry::Registry;

pub struct KubeScheduler {
    handle: Arc<FrameworkHandle>,
    // Map from scheduler name to the framework running that profile.
    profiles: HashMap<String, Framework>,
}

impl KubeScheduler {
    /// Builds every profile up front. Any plugin construction error aborts the whole scheduler.
    pub fn new(
        config: &KubeSchedulerConfiguration,
        registry: &Registry,
        handle: Arc<FrameworkHandle>,
    ) -> Result<Self, ConstructionError> {
        let mut profiles = HashMap::new();
        for profile in config.profiles.iter() {
            if profiles.contains_key(&profile.scheduler_name) {
                return Err(ConstructionError::DuplicateProfile(
                    profile.scheduler_name.clone(),
                ));
            }
            let framework = Framework::new(profile, registry, handle.clone())?;
            profiles.insert(profile.scheduler_name.clone(), framework);
        }
        Ok(Self { handle, profiles })
    }

    pub fn handle(&self) -> &Arc<FrameworkHandle> {
        &self.handle
    }

    pub fn framework(&self, scheduler_name: &str) -> Option<&Framework> {
        self.profiles.get(scheduler_name)
    }

    fn framework_for_pod(&self, pod: &Pod) -> Result<&Framework, ScheduleError> {
        self.profiles
            .get(pod.scheduler_name())
            .ok_or_else(|| ScheduleError::UnknownProfile(pod.scheduler_name().to_string()))
    }
}

impl PodSchedulingAlgorithm for KubeScheduler {
    fn schedule_one(&self, ctx: &Context, pod: &Pod) -> Result<ScheduleResult, ScheduleError> {
        self.framework_for_pod(pod)?.schedule_one(ctx, pod)
    }
}
