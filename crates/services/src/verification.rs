//! Speaking verification seam.

use async_trait::async_trait;
use practice_core::model::{Exercise, MediaUri};

use crate::error::VerificationError;

/// Grades a finalized speaking recording against its exercise.
#[async_trait]
pub trait SpeakingVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `VerificationError` when no verdict can be produced; the attempt
    /// may then be resubmitted.
    async fn verify(
        &self,
        exercise: &Exercise,
        recording: &MediaUri,
    ) -> Result<bool, VerificationError>;
}

/// Grades every finalized recording correct.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

#[async_trait]
impl SpeakingVerifier for AcceptAllVerifier {
    async fn verify(
        &self,
        _exercise: &Exercise,
        _recording: &MediaUri,
    ) -> Result<bool, VerificationError> {
        Ok(true)
    }
}
