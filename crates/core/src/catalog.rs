//! The fixed set of labels a round can ask the player to find.

use rand::Rng;
use strum::{Display, EnumCount, EnumString, IntoStaticStr, VariantArray};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumString,
    IntoStaticStr,
    VariantArray,
)]
pub enum Item {
    Person,
    Cat,
    Dog,
    Hat,
    Backpack,
    Umbrella,
    Shoe,
    #[strum(serialize = "Eye glasses")]
    EyeGlasses,
    Handbag,
    Tie,
    Suitcase,
    Frisbee,
    Sportsball,
    Plate,
    Cup,
    Fork,
    Knife,
    Spoon,
    Bowl,
    Banana,
    Apple,
    Sandwich,
    Orange,
    Broccoli,
    Carrot,
    Pizza,
    Donut,
    Cake,
    Chair,
    Couch,
    #[strum(serialize = "Potted plant")]
    PottedPlant,
    Mirror,
    Desk,
    Door,
    Tv,
    Laptop,
    Mouse,
    Keyboard,
    Cellphone,
    Blender,
    Book,
    Clock,
    Vase,
    Scissors,
    #[strum(serialize = "Teddy bear")]
    TeddyBear,
    #[strum(serialize = "Hair drier")]
    HairDrier,
    Toothbrush,
    #[strum(serialize = "Hair brush")]
    HairBrush,
}

impl Item {
    /// Uniform draw over the whole catalog. Consecutive draws may repeat.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::VARIANTS[rng.random_range(0..Self::VARIANTS.len())]
    }

    /// The label a detector reports for this item.
    pub fn label(self) -> &'static str {
        self.into()
    }
}
