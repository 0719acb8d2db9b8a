use log::{debug, info};
use reqwest::Url;

use crate::admin_client::AdminClient;
use crate::error::BookDeskError;
use crate::query_state::QueryState;

/// The navigable address of the listing being managed.
///
/// Methods were chosen from what the controller needs:
///
/// - `current`: the address as it stands, including its query
/// - `replace_query`: rewrite the query in place, without a history entry
/// - `navigate`: follow a link to another address, adding a history entry
/// - `reload`: re-render the data view from the current address
#[allow(async_fn_in_trait)]
pub trait Address {
    fn current(&self) -> &Url;

    fn replace_query(&mut self, query: &str);

    async fn navigate(&mut self, url: Url) -> Result<(), BookDeskError>;

    async fn reload(&mut self) -> Result<(), BookDeskError>;

    fn host(&self) -> Option<&str> {
        self.current().host_str()
    }
}

/// Mirrors `state` into the address query and reloads the data view.
pub async fn apply_state<A: Address>(address: &mut A, state: &QueryState) -> Result<(), BookDeskError> {
    let query = state.to_query_string();
    debug!("Applying listing state: {}", query);
    address.replace_query(&query);
    address.reload().await
}

/// An address that only records what happened to it.
#[derive(Debug, Clone)]
pub struct MemoryAddress {
    url: Url,
    history: Vec<Url>,
    reloads: Vec<Url>,
}

impl MemoryAddress {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            history: Vec::new(),
            reloads: Vec::new(),
        }
    }

    pub fn parse(url: &str) -> Result<Self, BookDeskError> {
        Url::parse(url)
            .map(Self::new)
            .map_err(|e| BookDeskError::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Addresses left behind by `navigate`, oldest first
    pub fn history(&self) -> &[Url] {
        &self.history
    }

    /// The address at the time of each reload
    pub fn reloads(&self) -> &[Url] {
        &self.reloads
    }
}

impl Address for MemoryAddress {
    fn current(&self) -> &Url {
        &self.url
    }

    fn replace_query(&mut self, query: &str) {
        set_query(&mut self.url, query);
    }

    async fn navigate(&mut self, url: Url) -> Result<(), BookDeskError> {
        let previous = std::mem::replace(&mut self.url, url);
        self.history.push(previous);
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), BookDeskError> {
        self.reloads.push(self.url.clone());
        Ok(())
    }
}

/// An address backed by the real listing page: reloading fetches it again.
#[derive(Debug, Clone)]
pub struct ListingAddress {
    url: Url,
    client: AdminClient,
}

impl ListingAddress {
    pub fn new(client: AdminClient, listing_path: &str) -> Result<Self, BookDeskError> {
        let url = client.resolve(listing_path)?;
        Ok(Self { url, client })
    }
}

impl Address for ListingAddress {
    fn current(&self) -> &Url {
        &self.url
    }

    fn replace_query(&mut self, query: &str) {
        set_query(&mut self.url, query);
    }

    /// The backend answers a followed link with a redirect back to a
    /// listing; the address lands wherever that redirect points.
    async fn navigate(&mut self, url: Url) -> Result<(), BookDeskError> {
        info!("Navigating to {}", url);
        self.url = self.client.fetch_page(&url).await?;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), BookDeskError> {
        self.client.fetch_page(&self.url).await.map(|_| ())
    }
}

fn set_query(url: &mut Url, query: &str) {
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(query));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_state::QueryDefaults;

    #[tokio::test]
    async fn test_apply_state_replaces_query_and_reloads() {
        let mut address = MemoryAddress::parse("http://localhost:8080/admin/kitaplar?page=7").unwrap();
        let mut state = QueryState::new(&QueryDefaults::default());
        state.set_search("dune");

        apply_state(&mut address, &state).await.unwrap();

        assert_eq!(
            address.current().as_str(),
            "http://localhost:8080/admin/kitaplar?page=1&size=10&sort=id,desc&search=dune"
        );
        assert!(address.history().is_empty(), "query replacement must not add history");
        assert_eq!(address.reloads().len(), 1);
        assert_eq!(address.reloads()[0], *address.current());
    }

    #[tokio::test]
    async fn test_navigate_adds_history() {
        let mut address = MemoryAddress::parse("http://localhost/admin/kitaplar").unwrap();
        address
            .navigate(Url::parse("http://localhost/admin/kitaplar/3/delete").unwrap())
            .await
            .unwrap();
        assert_eq!(address.history().len(), 1);
        assert_eq!(address.current().path(), "/admin/kitaplar/3/delete");
    }

    #[test]
    fn test_host() {
        let address = MemoryAddress::parse("http://localhost:8080/admin").unwrap();
        assert_eq!(address.host(), Some("localhost"));
    }

    #[test]
    fn test_listing_address_resolves_against_base() {
        let client = AdminClient::new("http://localhost:8080", "/admin/bulk-action").unwrap();
        let mut address = ListingAddress::new(client, "/admin/kitaplar").unwrap();
        address.replace_query("page=2&size=10&sort=id,desc");
        assert_eq!(
            address.current().as_str(),
            "http://localhost:8080/admin/kitaplar?page=2&size=10&sort=id,desc"
        );
    }
}
