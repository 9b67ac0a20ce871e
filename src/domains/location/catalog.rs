use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitatKind {
    Savanna,
    Arctic,
    Jungle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopKind {
    FoodStall,
    DrinkStand,
    GiftShop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    Habitat(HabitatKind),
    Shop(ShopKind),
}

/// Per-kind behaviour parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationParams {
    pub capacity: usize,
    pub sprite_key: &'static str,
    pub cost: u32,
    /// Footprint in tiles (width, height).
    pub footprint: (i32, i32),
    /// Hunger removed from a visitor per visit.
    pub hunger_relief: f32,
}

const SAVANNA: LocationParams = LocationParams {
    capacity: 3,
    sprite_key: "habitat_savanna",
    cost: 1500,
    footprint: (4, 3),
    hunger_relief: 0.0,
};

const ARCTIC: LocationParams = LocationParams {
    capacity: 2,
    sprite_key: "habitat_arctic",
    cost: 2000,
    footprint: (3, 3),
    hunger_relief: 0.0,
};

const JUNGLE: LocationParams = LocationParams {
    capacity: 3,
    sprite_key: "habitat_jungle",
    cost: 1800,
    footprint: (4, 4),
    hunger_relief: 0.0,
};

const FOOD_STALL: LocationParams = LocationParams {
    capacity: 2,
    sprite_key: "shop_food",
    cost: 400,
    footprint: (1, 1),
    hunger_relief: 100.0,
};

const DRINK_STAND: LocationParams = LocationParams {
    capacity: 2,
    sprite_key: "shop_drink",
    cost: 300,
    footprint: (1, 1),
    hunger_relief: 40.0,
};

const GIFT_SHOP: LocationParams = LocationParams {
    capacity: 3,
    sprite_key: "shop_gift",
    cost: 600,
    footprint: (2, 1),
    hunger_relief: 0.0,
};

impl LocationKind {
    pub fn params(&self) -> &'static LocationParams {
        match self {
            LocationKind::Habitat(HabitatKind::Savanna) => &SAVANNA,
            LocationKind::Habitat(HabitatKind::Arctic) => &ARCTIC,
            LocationKind::Habitat(HabitatKind::Jungle) => &JUNGLE,
            LocationKind::Shop(ShopKind::FoodStall) => &FOOD_STALL,
            LocationKind::Shop(ShopKind::DrinkStand) => &DRINK_STAND,
            LocationKind::Shop(ShopKind::GiftShop) => &GIFT_SHOP,
        }
    }

    pub fn is_habitat(&self) -> bool {
        matches!(self, LocationKind::Habitat(_))
    }

    pub fn is_shop(&self) -> bool {
        matches!(self, LocationKind::Shop(_))
    }
}
