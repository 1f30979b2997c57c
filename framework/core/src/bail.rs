/// Return this error from an iteration hook to retire the virtual user that raised it.
///
/// Use this when a user hits a problem that makes its own loop pointless but does not invalidate
/// the run. For example, if a user's connection to the target is refused and cannot be re-opened
/// then that user should bail while the remaining users carry on generating load.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct UserBailError {
    msg: String,
}

impl Default for UserBailError {
    fn default() -> Self {
        Self {
            msg: "Virtual user is bailing".to_string(),
        }
    }
}
