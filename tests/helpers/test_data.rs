//! Fake request builders

use std::sync::atomic::{AtomicU32, Ordering};
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use launchpad::models::{CreateCommentRequest, CreateProductRequest, RegisterRequest};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

static SEQUENCE: AtomicU32 = AtomicU32::new(1);

fn next_id() -> u32 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

pub fn fake_registration() -> RegisterRequest {
    let n = next_id();
    RegisterRequest {
        email: format!("maker{}@launchpad.test", n),
        username: format!("maker_{}", n),
        password: TEST_PASSWORD.to_string(),
        display_name: Some(CompanyName().fake()),
    }
}

pub fn fake_product() -> CreateProductRequest {
    let n = next_id();
    let company: String = CompanyName().fake();
    let tagline: String = Sentence(3..6).fake();

    CreateProductRequest {
        name: format!("{} {}", company, n),
        tagline: tagline.chars().take(140).collect(),
        description: Sentence(5..12).fake(),
        website_url: format!("https://product-{}.example.com", n),
        logo_url: None,
        category: "developer-tools".to_string(),
    }
}

pub fn fake_comment() -> CreateCommentRequest {
    CreateCommentRequest {
        body: Sentence(3..10).fake(),
        parent_id: None,
    }
}
