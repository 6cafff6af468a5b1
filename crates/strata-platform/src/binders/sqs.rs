use strata_capabilities::{
    BindingContext, BindingResult, BindingStrategy, CapabilityBindingResult,
};
use strata_core::AccessLevel;

use super::{actions_for, data_flag};
use crate::components::QUEUE_SQS;

const READ: &[&str] = &[
    "sqs:ReceiveMessage",
    "sqs:DeleteMessage",
    "sqs:ChangeMessageVisibility",
    "sqs:GetQueueAttributes",
];
const WRITE: &[&str] = &["sqs:SendMessage", "sqs:GetQueueAttributes"];

/// Grants a function access to a message queue.
///
/// Queue administration is not delegated to functions, so `admin` is
/// rejected.
#[derive(Debug, Clone, Copy)]
pub struct SqsBinder {
    source_type: &'static str,
}

impl SqsBinder {
    /// Strategy for `source_type` components.
    #[must_use]
    pub fn new(source_type: &'static str) -> Self {
        Self { source_type }
    }
}

impl BindingStrategy for SqsBinder {
    fn source_type(&self) -> &'static str {
        self.source_type
    }

    fn capability(&self) -> &'static str {
        QUEUE_SQS
    }

    fn supported_access(&self) -> &'static [AccessLevel] {
        &[AccessLevel::Read, AccessLevel::Write, AccessLevel::ReadWrite]
    }

    fn bind(&self, ctx: &BindingContext<'_>) -> BindingResult<CapabilityBindingResult> {
        let access = ctx.access();
        let mut actions = actions_for(access, READ, WRITE, &[]);
        if data_flag(ctx, "kms") {
            actions.push("kms:Decrypt");
            if access.can_write() {
                actions.push("kms:GenerateDataKey");
            }
        }

        let mut result =
            CapabilityBindingResult::grant(access, &actions, ctx.data_str("queueArn")?)
                .env(ctx, "QUEUE_URL", ctx.data_str("queueUrl")?)?;
        if data_flag(ctx, "fifo") {
            result = result.env(ctx, "QUEUE_FIFO", "true")?;
        }

        if ctx.framework.is_fedramp() {
            result = result.harden("sqs:deny-insecure-transport");
        }
        Ok(result)
    }
}
