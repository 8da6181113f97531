/// Entity named by a commerce-backend webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEntity {
    Product,
    Category,
    /// `page` and `cms_page` are both CMS pages.
    Page,
    Menu,
    Layout,
    Unknown(String),
}

impl WebhookEntity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "product" => Self::Product,
            "category" => Self::Category,
            "page" | "cms_page" => Self::Page,
            "menu" => Self::Menu,
            "layout" => Self::Layout,
            other => Self::Unknown(other.to_string()),
        }
    }
}
