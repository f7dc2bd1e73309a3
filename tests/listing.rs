//! Paged listing behaviour over the in-memory stores

use std::collections::HashMap;
use std::sync::Arc;
use travelboard::models::board_model::{BoardForm, BoardStore, NewBoard};
use travelboard::models::memory_store::{MemoryBoardStore, MemoryTravelStore};
use travelboard::models::travel_model::{NewTravel, TravelStore};
use travelboard::pagination::{fetch_page, ListingQuery, PageRequest, PaginationErr, SearchType};
use travelboard::services::{BoardService, TravelService};

/// 25 posts, numbers 1..=25; posts 3, 8, 13 and 21 mention "spring" in the title
async fn board_fixture() -> Arc<MemoryBoardStore> {
    let store = Arc::new(MemoryBoardStore::new());
    for i in 1..=25 {
        let title = if [3, 8, 13, 21].contains(&i) {
            format!("Spring trip {i}")
        } else {
            format!("Post {i}")
        };
        store
            .create(
                NewBoard {
                    title,
                    content: format!("content {i}"),
                    writer: if i % 2 == 0 { "alice" } else { "bob" }.to_string(),
                },
                vec![],
            )
            .await
            .unwrap();
    }
    store
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn first_page_holds_newest_posts() {
    let service = BoardService::new(board_fixture().await);
    let page = service.get_page(&PageRequest::of(1, 10).unwrap()).await.unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_count, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.first().unwrap().no, 25);
    assert_eq!(page.items.last().unwrap().no, 16);
}

#[tokio::test]
async fn last_page_is_partial() {
    let service = BoardService::new(board_fixture().await);
    let page = service.get_page(&PageRequest::of(3, 10).unwrap()).await.unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items.iter().map(|b| b.no).collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
    assert!(!page.next);
}

#[tokio::test]
async fn page_past_the_end_is_empty_with_accurate_totals() {
    let service = BoardService::new(board_fixture().await);
    let page = service.get_page(&PageRequest::of(4, 10).unwrap()).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!((page.start_page, page.end_page), (1, 3));
}

#[tokio::test]
async fn title_search_counts_only_matches() {
    let service = BoardService::new(board_fixture().await);
    let request = PageRequest::of(1, 10)
        .unwrap()
        .with_search(Some(SearchType::Title), "spring");
    let page = service.get_page(&request).await.unwrap();

    assert_eq!(page.total_count, 4);
    assert_eq!(page.items.iter().map(|b| b.no).collect::<Vec<_>>(), vec![21, 13, 8, 3]);
}

#[tokio::test]
async fn blank_keyword_lists_everything() {
    let service = BoardService::new(board_fixture().await);
    let request = PageRequest::from_params(&params(&[("type", "T"), ("keyword", "   ")])).unwrap();
    assert!(!request.has_search_condition());

    let page = service.get_page(&request).await.unwrap();
    assert_eq!(page.total_count, 25);
    assert_eq!(page.items.len(), 10);
}

#[tokio::test]
async fn unrecognized_type_does_not_restrict() {
    let service = BoardService::new(board_fixture().await);
    let request = PageRequest::from_params(&params(&[("type", "bogus"), ("keyword", "spring")])).unwrap();

    let page = service.get_page(&request).await.unwrap();
    assert_eq!(page.total_count, 25);
}

#[tokio::test]
async fn count_equals_sum_of_page_sizes() {
    let store = board_fixture().await;
    let searches = [
        (None, ""),
        (Some(SearchType::Title), "spring"),
        (Some(SearchType::Writer), "alice"),
        (Some(SearchType::TitleContent), "1"),
        (None, "content 2"),
    ];

    for amount in [1, 3, 7, 10, 30] {
        for (search_type, keyword) in searches {
            let base = PageRequest::of(1, amount).unwrap().with_search(search_type, keyword);
            let total = fetch_page(store.as_ref(), &base).await.unwrap().total_count;

            let mut seen = 0;
            let mut page_no = 1;
            loop {
                let request = PageRequest::of(page_no, amount)
                    .unwrap()
                    .with_search(search_type, keyword);
                let page = fetch_page(store.as_ref(), &request).await.unwrap();
                assert_eq!(page.total_count, total);
                if page.items.is_empty() {
                    break;
                }
                assert!(page.items.len() <= amount as usize);
                seen += page.items.len() as i64;
                page_no += 1;
            }
            assert_eq!(seen, total, "amount {amount}, {search_type:?} {keyword:?}");
        }
    }
}

#[tokio::test]
async fn matching_count_agrees_with_store_count() {
    let store = board_fixture().await;
    let request = PageRequest::default().with_search(Some(SearchType::Writer), "ALICE");

    assert_eq!(store.total_count_matching(&request).await.unwrap(), 12);
    assert_eq!(store.total_count().await.unwrap(), 25);
}

#[test]
fn zero_page_is_rejected() {
    assert!(matches!(
        PageRequest::from_params(&params(&[("page", "0")])),
        Err(PaginationErr::InvalidPage(_))
    ));
    assert!(matches!(
        PageRequest::from_params(&params(&[("amount", "-5")])),
        Err(PaginationErr::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn travel_listing_searches_description_and_district() {
    let store = Arc::new(MemoryTravelStore::new());
    for (district, title, description) in [
        ("Jeju", "Hallasan", "Volcano hike"),
        ("Seoul", "Gyeongbokgung", "Palace walk"),
        ("Jeju", "Udo", "Island by bike"),
        ("Busan", "Gamcheon", "Village of colours"),
    ] {
        store
            .create(
                NewTravel {
                    district: district.into(),
                    title: title.into(),
                    description: description.into(),
                    address: String::new(),
                    phone: String::new(),
                },
                vec![],
            )
            .await
            .unwrap();
    }
    let service = TravelService::new(store);

    let by_district = PageRequest::default().with_search(Some(SearchType::Writer), "jeju");
    let page = service.get_page(&by_district).await.unwrap();
    assert_eq!(page.items.iter().map(|t| t.no).collect::<Vec<_>>(), vec![1, 3]);

    let by_description = PageRequest::default().with_search(Some(SearchType::Content), "walk");
    assert_eq!(service.get_page(&by_description).await.unwrap().total_count, 1);

    let everything = service.get_page(&PageRequest::of(2, 3).unwrap()).await.unwrap();
    assert_eq!(everything.items.iter().map(|t| t.no).collect::<Vec<_>>(), vec![4]);
}

#[tokio::test]
async fn board_form_writes_show_up_in_listing() {
    let service = BoardService::new(board_fixture().await);
    service
        .create(
            "carol",
            BoardForm {
                title: "Another spring".into(),
                content: "blossoms".into(),
                attachments: vec![],
            },
        )
        .await
        .unwrap();

    let request = PageRequest::default().with_search(Some(SearchType::Title), "spring");
    let page = service.get_page(&request).await.unwrap();
    assert_eq!(page.total_count, 5);
    assert_eq!(page.items[0].writer, "carol");
}
