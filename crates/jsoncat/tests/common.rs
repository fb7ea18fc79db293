#![allow(missing_docs, dead_code)]

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Hotel {
    pub hotel_id: String,
    pub hotel_name: String,
    pub rating: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub country: String,
}

/// One pretty-printed document.
pub const SINGLE: &str = r#"{
  "HotelId": "1",
  "HotelName": "Secret Point Motel",
  "Rating": 3.6,
  "Tags": [ "pool", "air conditioning", "concierge" ],
  "Address": {
    "StreetAddress": "677 5th Ave",
    "City": "New York",
    "Country": "USA"
  }
}
"#;

/// Six documents, one per line.
pub const MULTICONTENT: &str = concat!(
    r#"{"HotelId":"1","HotelName":"Secret Point Motel","Rating":3.6,"Tags":["pool","air conditioning"],"Address":{"StreetAddress":"677 5th Ave","City":"New York","Country":"USA"}}"#,
    "\n",
    r#"{"HotelId":"2","HotelName":"Twin Dome Motel","Rating":3.6,"Tags":["pool","free wifi"],"Address":{"StreetAddress":"140 University Town Center Dr","City":"Sarasota","Country":"USA"}}"#,
    "\n",
    r#"{"HotelId":"3","HotelName":"Triple Landscape Hotel","Rating":4.8,"Tags":["air conditioning","bar"],"Address":{"StreetAddress":"3393 Peachtree Rd","City":"Atlanta","Country":"USA"}}"#,
    "\n",
    r#"{"HotelId":"4","HotelName":"Sublime Cliff Hotel","Rating":4.6,"Address":{"StreetAddress":"7400 San Pedro Ave","City":"San Antonio","Country":"USA"}}"#,
    "\n",
    r#"{"HotelId":"5","HotelName":"Gastronomic Landscape {Hotel}","Rating":4.2,"Tags":["restaurant","\"view\""],"Address":{"StreetAddress":"9 Main St\nSuite 2","City":"Lisbon","Country":"Portugal"}}"#,
    "\n",
    r#"{"HotelId":"6","HotelName":"Old Century Hotel","Rating":3.9,"Tags":[],"Address":{"StreetAddress":"1 Harbour Rd","City":"Sydney","Country":"Australia"}}"#,
    "\n",
);

/// Two complete documents, then one cut off mid-value.
pub const CORRUPTED: &str = concat!(
    r#"{"HotelId":"1","HotelName":"Secret Point Motel","Rating":3.6,"Address":{"StreetAddress":"677 5th Ave","City":"New York","Country":"USA"}}"#,
    "\n",
    r#"{"HotelId":"2","HotelName":"Twin Dome Motel","Rating":3.6,"Address":{"StreetAddress":"140 University Town Center Dr","City":"Sarasota","Country":"USA"}}"#,
    "\n",
    r#"{"HotelId":"3","HotelName":"Triple Landscape Hotel","Rating":4.8,"Address":{"StreetAd"#,
);

/// Hand out `payload` in reads of at most `size` bytes, like a file opened
/// with a tiny buffer.
pub struct Trickle<'a> {
    payload: &'a [u8],
    size: usize,
}

impl<'a> Trickle<'a> {
    pub fn new(payload: &'a str, size: usize) -> Self {
        Self {
            payload: payload.as_bytes(),
            size: size.max(1),
        }
    }
}

impl std::io::Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.size.min(buf.len()).min(self.payload.len());
        buf[..n].copy_from_slice(&self.payload[..n]);
        self.payload = &self.payload[n..];
        Ok(n)
    }
}
