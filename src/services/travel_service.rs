use crate::models::travel_model::{
    NewTravel, NewTravelImage, Travel, TravelErr, TravelImage, TravelStore,
};
use crate::pagination::{fetch_page, Page, PageRequest};
use std::sync::Arc;

/// Read side of the travel catalogue
#[derive(Clone)]
pub struct TravelService {
    store: Arc<dyn TravelStore>,
}

impl TravelService {
    pub fn new(store: Arc<dyn TravelStore>) -> Self {
        Self { store }
    }

    pub async fn get_page(&self, request: &PageRequest) -> Result<Page<Travel>, TravelErr> {
        Ok(fetch_page(self.store.as_ref(), request).await?)
    }

    /// Gets an entry together with its images
    pub async fn get(&self, no: i64) -> Result<Travel, TravelErr> {
        let mut travel = self.store.get(no).await?.ok_or(TravelErr::DoesNotExist(no))?;
        travel.images = self.store.images(no).await?;
        Ok(travel)
    }

    /// Adds an entry with its images.
    ///
    /// Only the seeding tool writes travel entries.
    pub async fn create(&self, travel: NewTravel, images: Vec<NewTravelImage>) -> Result<Travel, TravelErr> {
        let travel = self.store.create(travel, images).await?;

        tracing::debug!("Created travel entry {}", travel.no);
        self.get(travel.no).await
    }

    pub async fn get_image(&self, no: i64) -> Result<TravelImage, TravelErr> {
        self.store
            .get_image(no)
            .await?
            .ok_or(TravelErr::ImageDoesNotExist(no))
    }
}
