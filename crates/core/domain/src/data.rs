//! 领域数据类型
//!
//! 定义跨模块共享的封闭枚举与证据校验：
//! - DeviceType：设备类型（配额按类型计数）
//! - TripStatus / LoadStatus：行程状态机与载重状态
//! - MediaBundle：进出场证据包（磅单 + 照片）

use serde::{Deserialize, Serialize};

/// 行程证据包最少照片数。
pub const MIN_TRIP_PHOTOS: usize = 4;

/// 设备类型（封闭枚举，配额按类型限额）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    /// 车牌识别相机
    Anpr,
    /// 道闸
    Barrier,
    /// 生物识别终端
    Biometric,
}

impl DeviceType {
    /// 从数据库字符串解析（小写）。
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "anpr" => Some(Self::Anpr),
            "barrier" => Some(Self::Barrier),
            "biometric" => Some(Self::Biometric),
            _ => None,
        }
    }

    /// 数据库字符串表示（小写）。
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Anpr => "anpr",
            Self::Barrier => "barrier",
            Self::Biometric => "biometric",
        }
    }
}

/// 行程状态。INSIDE 为入场初态，EXITED 为唯一终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Inside,
    Exited,
}

impl TripStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "inside" => Some(Self::Inside),
            "exited" => Some(Self::Exited),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Inside => "inside",
            Self::Exited => "exited",
        }
    }
}

/// 车辆载重状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    Loaded,
    Empty,
}

impl LoadStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "loaded" => Some(Self::Loaded),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Empty => "empty",
        }
    }
}

/// 证据包校验错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("challan image reference required")]
    MissingChallan,
    #[error("at least {MIN_TRIP_PHOTOS} photos required, got {count}")]
    TooFewPhotos { count: usize },
}

/// 进出场证据包：磅单/票据影像 + 现场照片。
///
/// 入场与出场各自携带一份；入库前必须通过 `validate`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaBundle {
    pub challan: String,
    pub photos: Vec<String>,
}

impl MediaBundle {
    /// 校验证据完整性：磅单影像必填，照片不少于 MIN_TRIP_PHOTOS 张。
    pub fn validate(&self) -> Result<(), MediaError> {
        if self.challan.trim().is_empty() {
            return Err(MediaError::MissingChallan);
        }
        if self.photos.len() < MIN_TRIP_PHOTOS {
            return Err(MediaError::TooFewPhotos {
                count: self.photos.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(photos: usize) -> MediaBundle {
        MediaBundle {
            challan: "challan.jpg".to_string(),
            photos: (0..photos).map(|i| format!("photo-{i}.jpg")).collect(),
        }
    }

    #[test]
    fn media_bundle_accepts_full_evidence() {
        assert!(bundle(4).validate().is_ok());
        assert!(bundle(7).validate().is_ok());
    }

    #[test]
    fn media_bundle_rejects_missing_challan() {
        let mut media = bundle(4);
        media.challan = "  ".to_string();
        assert_eq!(media.validate(), Err(MediaError::MissingChallan));
    }

    #[test]
    fn media_bundle_rejects_too_few_photos() {
        assert_eq!(
            bundle(3).validate(),
            Err(MediaError::TooFewPhotos { count: 3 })
        );
    }

    #[test]
    fn device_type_round_trips_db_strings() {
        for device_type in [DeviceType::Anpr, DeviceType::Barrier, DeviceType::Biometric] {
            assert_eq!(DeviceType::from_db(device_type.as_db()), Some(device_type));
        }
        assert_eq!(DeviceType::from_db("camera"), None);
    }
}
