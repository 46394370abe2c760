use crate::catalog::PoiTable;
use crate::models::Poi;

pub fn poi(name: &str, category: &str, district: &str, region: &str, popularity: f64) -> Poi {
    Poi {
        name: name.to_string(),
        category: category.to_string(),
        district: district.to_string(),
        region: region.to_string(),
        popularity,
        lat: None,
        lon: None,
        price: None,
        characteristic: None,
    }
}

pub fn fixture_rows() -> Vec<Poi> {
    vec![
        poi("ION Orchard", "shopping_mall", "Orchard", "CENTRAL", 9.0),
        poi("Orchard Gallery", "gallery", "Orchard", "CENTRAL", 4.0),
        poi("Orchard Arcade", "arcade", "Orchard", "CENTRAL", 3.0),
        poi("Orchard Bar", "bar", "Orchard", "CENTRAL", 5.0),
        poi("Orchard Supermarket", "supermarket", "Orchard", "CENTRAL", 6.0),
        poi("Kallang Wave Mall", "shopping_mall", "Kallang", "CENTRAL", 4.0),
        poi("Kallang Bowl", "sports_center", "Kallang", "CENTRAL", 3.5),
        poi("Kallang Riverside Park", "park", "Kallang", "CENTRAL", 2.0),
        poi("Tampines Brew", "cafe", "Tampines", "EAST", 3.0),
        poi("Tampines Mall", "shopping_mall", "Tampines", "EAST", 6.0),
        poi("Tampines Eco Green", "park", "Tampines", "EAST", 2.5),
        poi("Tampines Hawker Centre", "hawker", "Tampines", "EAST", 4.0),
        poi("Tampines Clinic", "clinic", "Tampines", "EAST", 1.0),
        poi("Bedok Coffee House", "coffee", "Bedok", "EAST", 2.0),
        poi("Bedok Reservoir Park", "park", "Bedok", "EAST", 3.0),
        poi("Bedok Bank", "bank", "Bedok", "EAST", 1.0),
        poi("Jem Cafe", "cafe", "Jurong West", "WEST", 2.0),
        poi("Jurong Bird Park", "zoo", "Jurong West", "WEST", 7.0),
        poi("Jurong Point", "shopping_mall", "Jurong West", "WEST", 5.0),
        poi("Jurong Escape Room", "escape_room", "Jurong West", "WEST", 2.5),
        poi("Hougang Mall", "shopping_mall", "Hougang", "NORTH", 4.0),
        poi("Hougang Cafe", "cafe", "Hougang", "NORTH", 1.5),
        poi("Hougang Arcade", "arcade", "Hougang", "NORTH", 2.0),
        poi("Sembawang Park", "park", "Sembawang", "NORTH", 2.0),
        poi("Sembawang Hot Spring", "attraction", "Sembawang", "NORTH", 2.5),
        poi("Sentosa Beach", "beach", "Sentosa", "SOUTH", 5.0),
        poi("Universal Studios", "theme_park", "Sentosa", "SOUTH", 9.5),
    ]
}

pub fn fixture_catalog() -> PoiTable {
    PoiTable::new(fixture_rows())
}
