//! Test steps recorded during a test and their table rendering

use tracing::warn;

use crate::attachment::Attachment;
use crate::decorators::{self, COMMENT_CLASS};
use crate::error::{ExtrasError, ExtrasResult};

/// One row of the steps table
#[derive(Debug, Clone, Default)]
pub struct Step {
    /// Comment markup (already escaped when requested)
    pub comment: String,
    /// Reference or data URI of an image, video or audio clip
    pub multimedia: Option<String>,
    /// Reference or data URI of the page source
    pub source: Option<String>,
    pub attachment: Option<Attachment>,
    /// CSS classes of the comment, `COMMENT_CLASS` when absent
    pub class: Option<String>,
}

impl Step {
    pub fn comment(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_multimedia(mut self, uri: Option<String>) -> Self {
        self.multimedia = uri;
        self
    }

    pub fn with_source(mut self, uri: Option<String>) -> Self {
        self.source = uri;
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Markup of the `<tr>` element
    pub fn render(&self, single_page: bool) -> String {
        decorators::render_step_row(
            &self.comment,
            self.multimedia.as_deref(),
            self.source.as_deref(),
            self.attachment.as_ref(),
            single_page,
            self.class.as_deref().unwrap_or(COMMENT_CLASS),
        )
    }
}

/// Ordered steps of one test
#[derive(Debug, Clone, Default)]
pub struct StepLog {
    steps: Vec<Step>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip parallel columns into steps.
    ///
    /// All four columns must have the same length.
    pub fn from_columns(
        comments: Vec<String>,
        multimedia: Vec<Option<String>>,
        sources: Vec<Option<String>>,
        attachments: Vec<Option<Attachment>>,
    ) -> ExtrasResult<Self> {
        let len = comments.len();
        if multimedia.len() != len || sources.len() != len || attachments.len() != len {
            return Err(ExtrasError::StepLengthMismatch {
                comments: len,
                multimedia: multimedia.len(),
                sources: sources.len(),
                attachments: attachments.len(),
            });
        }

        let steps = comments
            .into_iter()
            .zip(multimedia)
            .zip(sources)
            .zip(attachments)
            .map(|(((comment, multimedia), source), attachment)| Step {
                comment,
                multimedia,
                source,
                attachment,
                class: None,
            })
            .collect();
        Ok(Self { steps })
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Concatenated rows, without the enclosing table
    pub fn render_rows(&self, single_page: bool) -> String {
        self.steps.iter().map(|step| step.render(single_page)).collect()
    }
}

/// Rows for parallel columns, or nothing when their lengths differ
pub fn render_columns(
    comments: Vec<String>,
    multimedia: Vec<Option<String>>,
    sources: Vec<Option<String>>,
    attachments: Vec<Option<Attachment>>,
    single_page: bool,
) -> String {
    match StepLog::from_columns(comments, multimedia, sources, attachments) {
        Ok(log) => log.render_rows(single_page),
        Err(e) => {
            warn!("Steps won't be logged for this test: {}", e);
            String::new()
        }
    }
}
