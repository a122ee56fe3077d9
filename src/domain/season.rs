//! Seasonal travel recommendations for Maharashtra.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Monsoon,
    Summer,
    Winter,
}

impl FromStr for Season {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monsoon" => Ok(Self::Monsoon),
            "summer" => Ok(Self::Summer),
            "winter" => Ok(Self::Winter),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Monsoon => "monsoon",
            Self::Summer => "summer",
            Self::Winter => "winter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalPlace {
    pub name: &'static str,
    pub text: &'static str,
    pub img: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonGuide {
    pub season: Season,
    pub recommended: &'static [SeasonalPlace],
    pub avoid: &'static [SeasonalPlace],
}

const MONSOON_RECOMMENDED: &[SeasonalPlace] = &[
    SeasonalPlace {
        name: "Lonavala & Khandala",
        text: "Famous for waterfalls and lush greenery.",
        img: "https://govindaresorts.com/wp-content/uploads/june-blog2-cover.jpg",
    },
    SeasonalPlace {
        name: "Malshej Ghat",
        text: "Cloud-kissed peaks and migratory flamingos.",
        img: "https://www.tourmyindia.com/states/maharashtra/images/malshej-ghat1.jpg",
    },
    SeasonalPlace {
        name: "Bhimashankar",
        text: "Misty forests and ancient Jyotirlinga.",
        img: "https://www.revv.co.in/blogs/wp-content/uploads/2020/05/Bhimshankar-Temple-1280x720.jpg",
    },
];

const MONSOON_AVOID: &[SeasonalPlace] = &[SeasonalPlace {
    name: "Beaches (Konkan)",
    text: "High tides and rough seas make it unsafe.",
    img: "https://mediaim.expedia.com/destination/2/aa05685d4972ffb269e7a8433432695e.jpg",
}];

const SUMMER_RECOMMENDED: &[SeasonalPlace] = &[
    SeasonalPlace {
        name: "Mahabaleshwar",
        text: "Cool climate and strawberry farms.",
        img: "https://hikerwolf.com/wp-content/uploads/2020/09/lodwick_point1.jpg",
    },
    SeasonalPlace {
        name: "Tadoba Andhari",
        text: "Best time for tiger sightings at waterholes.",
        img: "https://media.istockphoto.com/id/1129798883/photo/tigress-crossing-near-sign-board-tadoba-maharashtra-india.jpg?s=612x612&w=0&k=20&c=fEqDPAPgewG_atvN2pkS3u0nl7PYT7cj161zAl8DCPY=",
    },
    SeasonalPlace {
        name: "Alibaug",
        text: "Coastal breeze makes evenings pleasant.",
        img: "https://www.fabhotels.com/blog/wp-content/uploads/2023/05/Kulaba-Fort.jpg",
    },
];

const SUMMER_AVOID: &[SeasonalPlace] = &[SeasonalPlace {
    name: "Nagpur & Vidarbha",
    text: "Extremely high temperatures (45°C+).",
    img: "https://upload.wikimedia.org/wikipedia/commons/thumb/e/e0/Nagpur_Railway_Station.jpg/1200px-Nagpur_Railway_Station.jpg",
}];

const WINTER_RECOMMENDED: &[SeasonalPlace] = &[
    SeasonalPlace {
        name: "Aurangabad (Ajanta/Ellora)",
        text: "Pleasant weather for exploring caves.",
        img: "https://travelsetu.com/apps/uploads/new_destinations_photos/destination/2023/12/28/645e299540a48d37deab1dc2c14c8bad_1000x1000.jpg",
    },
    SeasonalPlace {
        name: "Nashik (Vineyards)",
        text: "Perfect for wine tours and tasting.",
        img: "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcRTze2w325ty8k5xo62vQOvCsgYevTNJpsamQ&s",
    },
    SeasonalPlace {
        name: "Tarkarli",
        text: "Clear waters ideal for scuba diving.",
        img: "https://www.captureatrip.com/_next/image?url=https%3A%2F%2Fcaptureatrip-cms-storage.s3.ap-south-1.amazonaws.com%2FPlaces_to_Visit_in_Tarkarli_2e9660fa98.webp&w=3840&q=50",
    },
];

const WINTER_AVOID: &[SeasonalPlace] = &[SeasonalPlace {
    name: "Malshej Ghat",
    text: "Waterfalls dry up; less scenic than monsoon.",
    img: "https://www.tourmyindia.com/states/maharashtra/images/malshej-ghat1.jpg",
}];

impl Season {
    pub fn guide(self) -> SeasonGuide {
        let (recommended, avoid) = match self {
            Self::Monsoon => (MONSOON_RECOMMENDED, MONSOON_AVOID),
            Self::Summer => (SUMMER_RECOMMENDED, SUMMER_AVOID),
            Self::Winter => (WINTER_RECOMMENDED, WINTER_AVOID),
        };
        SeasonGuide {
            season: self,
            recommended,
            avoid,
        }
    }
}
