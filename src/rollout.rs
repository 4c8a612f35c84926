use chrono::{DateTime, Utc};

use crate::api::machine_deployment::MachineDeployment;

/// Annotation carrying the time of the last forced rollout.
pub static DATE_ANNOTATION: &str = "date";

/// Marker recognised by the TKG controllers, forcing the OS image to be resolved again.
pub static RESOLVE_OS_IMAGE_ANNOTATION: &str = "run.tanzu.vmware.com/resolve-os-image";

/// `date(1)` layout with milliseconds, e.g. `Wed Feb 25 11:06:39.000 UTC 2015`.
pub static TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S%.3f %Z %Y";

/// Stamp the machine template so the MachineDeployment rolls all of its machines.
///
/// Changing the template annotations is what makes Cluster API create a new MachineSet,
/// so this always mutates the object as long as `now` moved forward.
pub fn bump_rollout(deployment: &mut MachineDeployment, now: DateTime<Utc>) {
    let annotations = &mut deployment.spec.template.metadata.annotations;
    annotations.insert(
        DATE_ANNOTATION.to_string(),
        now.format(TIMESTAMP_FORMAT).to_string(),
    );
    annotations.insert(
        RESOLVE_OS_IMAGE_ANNOTATION.to_string(),
        RESOLVE_OS_IMAGE_ANNOTATION.to_string(),
    );
}
