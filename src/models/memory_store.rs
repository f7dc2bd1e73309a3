//! In-memory stores
//!
//! Same contracts as the Postgres stores, kept in `RwLock`ed vectors. They back the `test`
//! profile and the test suites. Keyword matching lower-cases both sides to line up with `ILIKE`.

use crate::models::board_model::{Board, BoardAttachment, BoardStore, NewAttachment, NewBoard};
use crate::models::member_model::{Member, MemberStore, NewMember};
use crate::models::travel_model::{NewTravel, NewTravelImage, Travel, TravelImage, TravelStore};
use crate::pagination::{ListingQuery, PageRequest, SearchField};
use crate::types::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

fn window<T: Clone>(rows: Vec<&T>, request: &PageRequest) -> Vec<T> {
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    rows.into_iter()
        .skip(offset)
        .take(request.amount() as usize)
        .cloned()
        .collect()
}

/// Rows of `rows` that satisfy the request's search condition; all of them when it has none
fn matching<'a, T>(
    rows: impl Iterator<Item = &'a T>,
    request: &PageRequest,
    value_of: impl Fn(&'a T, SearchField) -> &'a str,
) -> Vec<&'a T> {
    match request.search_filter() {
        Some(filter) => rows.filter(|row| filter.matches(|field| value_of(*row, field))).collect(),
        None => rows.collect(),
    }
}

/// Same column mapping as `board_column`
fn board_value(board: &Board, field: SearchField) -> &str {
    match field {
        SearchField::Title => &board.title,
        SearchField::Content => &board.content,
        SearchField::Writer => &board.writer,
    }
}

/// Same column mapping as `travel_column`
fn travel_value(travel: &Travel, field: SearchField) -> &str {
    match field {
        SearchField::Title => &travel.title,
        SearchField::Content => &travel.description,
        SearchField::Writer => &travel.district,
    }
}

#[derive(Debug)]
pub struct MemoryBoardStore {
    boards: RwLock<Vec<Board>>,
    attachments: RwLock<Vec<BoardAttachment>>,
    next_no: AtomicI64,
    next_attachment_no: AtomicI64,
}

impl Default for MemoryBoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self {
            boards: RwLock::new(Vec::new()),
            attachments: RwLock::new(Vec::new()),
            next_no: AtomicI64::new(1),
            next_attachment_no: AtomicI64::new(1),
        }
    }

    async fn push_attachments(&self, bno: i64, attachments: Vec<NewAttachment>) {
        let mut stored = self.attachments.write().await;
        for attachment in attachments {
            stored.push(BoardAttachment {
                no: self.next_attachment_no.fetch_add(1, Ordering::SeqCst),
                bno,
                filename: attachment.filename,
                path: attachment.path,
                content_type: attachment.content_type,
                size: attachment.size,
                reg_date: Utc::now(),
            });
        }
    }

    /// Boards newest first
    async fn sorted(&self) -> Vec<Board> {
        let mut boards = self.boards.read().await.clone();
        boards.sort_by(|a, b| b.no.cmp(&a.no));
        boards
    }
}

#[async_trait]
impl ListingQuery<Board> for MemoryBoardStore {
    async fn total_count(&self) -> Result<i64, StoreError> {
        Ok(self.boards.read().await.len() as i64)
    }

    async fn total_count_matching(&self, request: &PageRequest) -> Result<i64, StoreError> {
        let boards = self.boards.read().await;
        Ok(matching(boards.iter(), request, board_value).len() as i64)
    }

    async fn page(&self, request: &PageRequest) -> Result<Vec<Board>, StoreError> {
        let boards = self.sorted().await;
        Ok(window(boards.iter().collect(), request))
    }

    async fn page_matching(&self, request: &PageRequest) -> Result<Vec<Board>, StoreError> {
        let boards = self.sorted().await;
        Ok(window(matching(boards.iter(), request, board_value), request))
    }
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn get(&self, no: i64) -> Result<Option<Board>, StoreError> {
        Ok(self.boards.read().await.iter().find(|b| b.no == no).cloned())
    }

    async fn create(&self, board: NewBoard, attachments: Vec<NewAttachment>) -> Result<Board, StoreError> {
        let mut boards = self.boards.write().await;
        let now = Utc::now();
        let board = Board {
            no: self.next_no.fetch_add(1, Ordering::SeqCst),
            title: board.title,
            content: board.content,
            writer: board.writer,
            reg_date: now,
            update_date: now,
            attachments: Vec::new(),
        };
        self.push_attachments(board.no, attachments).await;
        boards.push(board.clone());
        Ok(board)
    }

    async fn update(
        &self,
        no: i64,
        title: &str,
        content: &str,
        attachments: Vec<NewAttachment>,
    ) -> Result<bool, StoreError> {
        let mut boards = self.boards.write().await;
        let Some(board) = boards.iter_mut().find(|b| b.no == no) else {
            return Ok(false);
        };
        board.title = title.to_string();
        board.content = content.to_string();
        board.update_date = Utc::now();
        self.push_attachments(no, attachments).await;
        Ok(true)
    }

    async fn delete(&self, no: i64) -> Result<bool, StoreError> {
        let mut boards = self.boards.write().await;
        let before = boards.len();
        boards.retain(|b| b.no != no);
        let deleted = boards.len() != before;
        if deleted {
            self.attachments.write().await.retain(|a| a.bno != no);
        }
        Ok(deleted)
    }

    async fn attachments(&self, bno: i64) -> Result<Vec<BoardAttachment>, StoreError> {
        Ok(self
            .attachments
            .read()
            .await
            .iter()
            .filter(|a| a.bno == bno)
            .cloned()
            .collect())
    }

    async fn get_attachment(&self, no: i64) -> Result<Option<BoardAttachment>, StoreError> {
        Ok(self.attachments.read().await.iter().find(|a| a.no == no).cloned())
    }

    async fn delete_attachment(&self, no: i64) -> Result<bool, StoreError> {
        let mut attachments = self.attachments.write().await;
        let before = attachments.len();
        attachments.retain(|a| a.no != no);
        Ok(attachments.len() != before)
    }
}

#[derive(Debug, Default)]
pub struct MemoryMemberStore {
    members: RwLock<Vec<Member>>,
}

impl MemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn find(&self, username: &str) -> Result<Option<Member>, StoreError> {
        Ok(self
            .members
            .read()
            .await
            .iter()
            .find(|m| m.username == username)
            .cloned())
    }

    async fn insert(&self, member: NewMember) -> Result<Member, StoreError> {
        let mut members = self.members.write().await;
        if members.iter().any(|m| m.username == member.username) {
            return Err(StoreError::Duplicate(member.username));
        }

        let now = Utc::now();
        let member = Member {
            username: member.username,
            password: member.password_hash,
            email: member.email,
            reg_date: now,
            update_date: now,
            auth_list: member.auth_list,
        };
        members.push(member.clone());
        Ok(member)
    }

    async fn update_email(&self, username: &str, email: &str) -> Result<bool, StoreError> {
        let mut members = self.members.write().await;
        match members.iter_mut().find(|m| m.username == username) {
            Some(member) => {
                member.email = email.to_string();
                member.update_date = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        let mut members = self.members.write().await;
        match members.iter_mut().find(|m| m.username == username) {
            Some(member) => {
                member.password = password_hash.to_string();
                member.update_date = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug)]
pub struct MemoryTravelStore {
    travels: RwLock<Vec<Travel>>,
    images: RwLock<Vec<TravelImage>>,
    next_no: AtomicI64,
    next_image_no: AtomicI64,
}

impl Default for MemoryTravelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTravelStore {
    pub fn new() -> Self {
        Self {
            travels: RwLock::new(Vec::new()),
            images: RwLock::new(Vec::new()),
            next_no: AtomicI64::new(1),
            next_image_no: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl ListingQuery<Travel> for MemoryTravelStore {
    async fn total_count(&self) -> Result<i64, StoreError> {
        Ok(self.travels.read().await.len() as i64)
    }

    async fn total_count_matching(&self, request: &PageRequest) -> Result<i64, StoreError> {
        let travels = self.travels.read().await;
        Ok(matching(travels.iter(), request, travel_value).len() as i64)
    }

    // numbers are handed out in insertion order, so the vector is already sorted
    async fn page(&self, request: &PageRequest) -> Result<Vec<Travel>, StoreError> {
        let travels = self.travels.read().await;
        Ok(window(travels.iter().collect(), request))
    }

    async fn page_matching(&self, request: &PageRequest) -> Result<Vec<Travel>, StoreError> {
        let travels = self.travels.read().await;
        Ok(window(matching(travels.iter(), request, travel_value), request))
    }
}

#[async_trait]
impl TravelStore for MemoryTravelStore {
    async fn get(&self, no: i64) -> Result<Option<Travel>, StoreError> {
        Ok(self.travels.read().await.iter().find(|t| t.no == no).cloned())
    }

    async fn create(&self, travel: NewTravel, images: Vec<NewTravelImage>) -> Result<Travel, StoreError> {
        let mut travels = self.travels.write().await;
        let travel = Travel {
            no: self.next_no.fetch_add(1, Ordering::SeqCst),
            district: travel.district,
            title: travel.title,
            description: travel.description,
            address: travel.address,
            phone: travel.phone,
            images: Vec::new(),
        };

        let mut stored = self.images.write().await;
        for image in images {
            stored.push(TravelImage {
                no: self.next_image_no.fetch_add(1, Ordering::SeqCst),
                travel_no: travel.no,
                filename: image.filename,
                path: image.path,
            });
        }

        travels.push(travel.clone());
        Ok(travel)
    }

    async fn images(&self, travel_no: i64) -> Result<Vec<TravelImage>, StoreError> {
        Ok(self
            .images
            .read()
            .await
            .iter()
            .filter(|i| i.travel_no == travel_no)
            .cloned()
            .collect())
    }

    async fn get_image(&self, no: i64) -> Result<Option<TravelImage>, StoreError> {
        Ok(self.images.read().await.iter().find(|i| i.no == no).cloned())
    }
}
