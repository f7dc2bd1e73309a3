use crate::models::board_model::{
    AttachmentForm, Board, BoardAttachment, BoardErr, BoardForm, BoardStore, NewAttachment, NewBoard,
};
use crate::pagination::{fetch_page, Page, PageRequest};
use std::sync::Arc;

/// Board rules on top of a `BoardStore`: paging, writer-only edits, attachment ownership
#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn BoardStore>,
}

impl BoardService {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self { store }
    }

    pub async fn get_page(&self, request: &PageRequest) -> Result<Page<Board>, BoardErr> {
        Ok(fetch_page(self.store.as_ref(), request).await?)
    }

    /// Gets a post together with its attachments
    ///
    /// # Errors
    /// `DoesNotExist` when there is no post with that number
    pub async fn get(&self, no: i64) -> Result<Board, BoardErr> {
        let mut board = self.store.get(no).await?.ok_or(BoardErr::DoesNotExist(no))?;
        board.attachments = self.store.attachments(no).await?;
        Ok(board)
    }

    /// Creates a post written by `writer` and links the given attachments to it
    pub async fn create(&self, writer: &str, form: BoardForm) -> Result<Board, BoardErr> {
        validate(&form)?;

        let board = self
            .store
            .create(
                NewBoard {
                    title: form.title,
                    content: form.content,
                    writer: writer.to_string(),
                },
                attachments(form.attachments),
            )
            .await?;

        tracing::info!("Created post {} by {}", board.no, writer);
        self.get(board.no).await
    }

    /// Updates title and content; any attachments in the form are added to the post
    ///
    /// # Errors
    /// - `DoesNotExist` when there is no such post
    /// - `NotWriter` when `actor` did not write it
    pub async fn update(&self, no: i64, actor: &str, form: BoardForm) -> Result<Board, BoardErr> {
        validate(&form)?;
        self.owned_by(no, actor).await?;

        let added = attachments(form.attachments);
        if !self.store.update(no, &form.title, &form.content, added).await? {
            return Err(BoardErr::DoesNotExist(no));
        }

        tracing::info!("Updated post {}", no);
        self.get(no).await
    }

    /// Deletes a post and its attachments, returning the post as it was
    pub async fn delete(&self, no: i64, actor: &str) -> Result<Board, BoardErr> {
        self.owned_by(no, actor).await?;
        let board = self.get(no).await?;

        if !self.store.delete(no).await? {
            return Err(BoardErr::DoesNotExist(no));
        }

        tracing::info!("Deleted post {}", no);
        Ok(board)
    }

    pub async fn get_attachment(&self, no: i64) -> Result<BoardAttachment, BoardErr> {
        self.store
            .get_attachment(no)
            .await?
            .ok_or(BoardErr::AttachmentDoesNotExist(no))
    }

    /// Deletes one attachment. Only the writer of the owning post may do this.
    pub async fn delete_attachment(&self, no: i64, actor: &str) -> Result<BoardAttachment, BoardErr> {
        let attachment = self.get_attachment(no).await?;
        self.owned_by(attachment.bno, actor).await?;

        if !self.store.delete_attachment(no).await? {
            return Err(BoardErr::AttachmentDoesNotExist(no));
        }

        tracing::info!("Deleted attachment {} of post {}", no, attachment.bno);
        Ok(attachment)
    }

    async fn owned_by(&self, no: i64, actor: &str) -> Result<(), BoardErr> {
        let board = self.store.get(no).await?.ok_or(BoardErr::DoesNotExist(no))?;
        if board.writer != actor {
            return Err(BoardErr::NotWriter(actor.to_string(), no));
        }
        Ok(())
    }
}

fn attachments(forms: Vec<AttachmentForm>) -> Vec<NewAttachment> {
    forms.into_iter().map(NewAttachment::from).collect()
}

fn validate(form: &BoardForm) -> Result<(), BoardErr> {
    if form.title.trim().is_empty() {
        return Err(BoardErr::InvalidInput("title must not be blank".to_string()));
    }
    Ok(())
}
