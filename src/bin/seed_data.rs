use clap::Parser;
use fake::faker::address::raw::{CityName, StreetName};
use fake::faker::internet::raw::{SafeEmail, Username};
use fake::faker::lorem::raw::{Paragraph, Sentence};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::EN;
use fake::Fake;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::error::Error;
use travelboard::config::{AppConfig, AppState};
use travelboard::models::board_model::BoardForm;
use travelboard::models::member_model::MemberJoinRequest;
use travelboard::models::travel_model::{NewTravel, NewTravelImage};

const DISTRICTS: [&str; 8] = [
    "Seoul", "Busan", "Incheon", "Gangwon", "Gyeonggi", "Jeju", "Jeolla", "Gyeongsang",
];

/// Fills the configured store with generated members, posts and travel entries
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Number of members
    #[arg(long, default_value_t = 20)]
    members: u32,

    /// Number of board posts, written by random members
    #[arg(long, default_value_t = 120)]
    posts: u32,

    /// Number of travel entries
    #[arg(long, default_value_t = 60)]
    travels: u32,

    /// Password given to every generated member
    #[arg(long, default_value = "password")]
    password: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    println!("Using parameters:");
    println!("Members: {}", cli.members);
    println!("Posts: {}", cli.posts);
    println!("Travels: {}", cli.travels);

    match cli.generate_data().await {
        Ok(()) => println!("Successfully generated data"),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

impl Cli {
    async fn generate_data(&self) -> Result<(), Box<dyn Error>> {
        let config = AppConfig::from_env()?;
        let app_state = AppState::new(config).await?;

        let usernames = self.generate_members(&app_state).await?;
        self.generate_posts(&app_state, &usernames).await?;
        self.generate_travels(&app_state).await?;

        Ok(())
    }

    async fn generate_members(&self, app_state: &AppState) -> Result<Vec<String>, Box<dyn Error>> {
        let mut usernames = Vec::new();
        for i in 1..=self.members {
            let base: String = Username(EN).fake();
            let username: String = format!("{base}{i}")
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();

            if app_state.members.check_duplicate(&username).await? {
                usernames.push(username);
                continue;
            }

            let member = app_state
                .members
                .join(MemberJoinRequest {
                    username,
                    password: self.password.clone(),
                    email: SafeEmail(EN).fake(),
                })
                .await?;
            usernames.push(member.username);
        }
        Ok(usernames)
    }

    async fn generate_posts(&self, app_state: &AppState, usernames: &[String]) -> Result<(), Box<dyn Error>> {
        let mut rng = rand::rng();
        for _ in 1..=self.posts {
            let Some(writer) = usernames.choose(&mut rng) else {
                return Ok(());
            };

            let form = BoardForm {
                title: Sentence(EN, 3..8).fake(),
                content: Paragraph(EN, 2..5).fake(),
                attachments: vec![],
            };
            app_state.boards.create(writer, form).await?;
        }
        Ok(())
    }

    async fn generate_travels(&self, app_state: &AppState) -> Result<(), Box<dyn Error>> {
        let mut rng = rand::rng();
        for i in 1..=self.travels {
            let district = DISTRICTS[rng.random_range(0..DISTRICTS.len())];
            let city: String = CityName(EN).fake();
            let street: String = StreetName(EN).fake();

            let travel = NewTravel {
                district: district.to_string(),
                title: format!("{city} {}", Sentence(EN, 1..3).fake::<String>()),
                description: Paragraph(EN, 3..6).fake(),
                address: format!("{street}, {district}"),
                phone: PhoneNumber(EN).fake(),
            };

            let image_count = rng.random_range(0..=3);
            let images = (1..=image_count)
                .map(|n| {
                    let filename = format!("travel_{i}_{n}.jpg");
                    let path = format!("travel/{filename}");
                    NewTravelImage { filename, path }
                })
                .collect();

            app_state.travels.create(travel, images).await?;
        }
        Ok(())
    }
}
