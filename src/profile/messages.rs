//! The decoded message types and the per-message field registry.
//!
//! One [`messages!`] table drives everything here: each entry names a global
//! message number and lists the profile's fields for it by number and base
//! type. From that, the macro emits the message struct (every field starting
//! at its base type's invalid value), the typed setter the data-message
//! parser publishes through, the [`Message`] union, and the [`field`] and
//! [`known`] registry lookups.

use chrono::{DateTime, FixedOffset, Utc};

use super::{BaseType, FieldInfo, FieldKind, Latitude, Longitude, Value};

/// The reserved global message number marking an invalid definition.
pub const MESG_NUM_INVALID: u16 = 0xFFFF;

/// The storage type for a field declaration.
macro_rules! field_ty {
    (enum_) => { u8 };
    (uint8) => { u8 };
    (uint8z) => { u8 };
    (byte) => { u8 };
    (sint8) => { i8 };
    (sint16) => { i16 };
    (uint16) => { u16 };
    (uint16z) => { u16 };
    (sint32) => { i32 };
    (uint32) => { u32 };
    (uint32z) => { u32 };
    (float32) => { f32 };
    (float64) => { f64 };
    (string) => { String };
    (timestamp) => { Option<DateTime<Utc>> };
    (local_timestamp) => { Option<DateTime<FixedOffset>> };
    (lat) => { Latitude };
    (lng) => { Longitude };
    ([$t:ident]) => { Vec<field_ty!($t)> };
}

/// The invalid value a field starts at.
macro_rules! field_init {
    (enum_) => { u8::MAX };
    (uint8) => { u8::MAX };
    (uint8z) => { 0 };
    (byte) => { u8::MAX };
    (sint8) => { i8::MAX };
    (sint16) => { i16::MAX };
    (uint16) => { u16::MAX };
    (uint16z) => { 0 };
    (sint32) => { i32::MAX };
    (uint32) => { u32::MAX };
    (uint32z) => { 0 };
    (float32) => { f32::from_bits(u32::MAX) };
    (float64) => { f64::from_bits(u64::MAX) };
    (string) => { String::new() };
    (timestamp) => { None };
    (local_timestamp) => { None };
    (lat) => { Latitude::INVALID };
    (lng) => { Longitude::INVALID };
    ([$t:ident]) => { Vec::new() };
}

/// The registry entry for a field declaration.
macro_rules! field_info {
    ($n:literal, enum_) => { FieldInfo { num: $n, base_type: BaseType::Enum, kind: FieldKind::Fit, array: false } };
    ($n:literal, uint8) => { FieldInfo { num: $n, base_type: BaseType::Uint8, kind: FieldKind::Fit, array: false } };
    ($n:literal, uint8z) => { FieldInfo { num: $n, base_type: BaseType::Uint8z, kind: FieldKind::Fit, array: false } };
    ($n:literal, byte) => { FieldInfo { num: $n, base_type: BaseType::Byte, kind: FieldKind::Fit, array: false } };
    ($n:literal, sint8) => { FieldInfo { num: $n, base_type: BaseType::Sint8, kind: FieldKind::Fit, array: false } };
    ($n:literal, sint16) => { FieldInfo { num: $n, base_type: BaseType::Sint16, kind: FieldKind::Fit, array: false } };
    ($n:literal, uint16) => { FieldInfo { num: $n, base_type: BaseType::Uint16, kind: FieldKind::Fit, array: false } };
    ($n:literal, uint16z) => { FieldInfo { num: $n, base_type: BaseType::Uint16z, kind: FieldKind::Fit, array: false } };
    ($n:literal, sint32) => { FieldInfo { num: $n, base_type: BaseType::Sint32, kind: FieldKind::Fit, array: false } };
    ($n:literal, uint32) => { FieldInfo { num: $n, base_type: BaseType::Uint32, kind: FieldKind::Fit, array: false } };
    ($n:literal, uint32z) => { FieldInfo { num: $n, base_type: BaseType::Uint32z, kind: FieldKind::Fit, array: false } };
    ($n:literal, float32) => { FieldInfo { num: $n, base_type: BaseType::Float32, kind: FieldKind::Fit, array: false } };
    ($n:literal, float64) => { FieldInfo { num: $n, base_type: BaseType::Float64, kind: FieldKind::Fit, array: false } };
    ($n:literal, string) => { FieldInfo { num: $n, base_type: BaseType::String, kind: FieldKind::Fit, array: false } };
    ($n:literal, timestamp) => { FieldInfo { num: $n, base_type: BaseType::Uint32, kind: FieldKind::TimeUtc, array: false } };
    ($n:literal, local_timestamp) => { FieldInfo { num: $n, base_type: BaseType::Uint32, kind: FieldKind::TimeLocal, array: false } };
    ($n:literal, lat) => { FieldInfo { num: $n, base_type: BaseType::Sint32, kind: FieldKind::Lat, array: false } };
    ($n:literal, lng) => { FieldInfo { num: $n, base_type: BaseType::Sint32, kind: FieldKind::Lng, array: false } };
    ($n:literal, [$t:ident]) => { field_info!($n, $t).array() };
}

/// The setter body publishing a [`Value`] into a field declaration.
///
/// A value of an unexpected shape is dropped; the shapes are fixed by the
/// same table that drives the parser, so a mismatch cannot arise from wire
/// data alone.
macro_rules! set_field_arm {
    ($s:ident, $f:ident, $v:ident, enum_) => { if let Value::Uint(x) = $v { $s.$f = x as u8 } };
    ($s:ident, $f:ident, $v:ident, uint8) => { if let Value::Uint(x) = $v { $s.$f = x as u8 } };
    ($s:ident, $f:ident, $v:ident, uint8z) => { if let Value::Uint(x) = $v { $s.$f = x as u8 } };
    ($s:ident, $f:ident, $v:ident, byte) => { if let Value::Uint(x) = $v { $s.$f = x as u8 } };
    ($s:ident, $f:ident, $v:ident, sint8) => { if let Value::Int(x) = $v { $s.$f = x as i8 } };
    ($s:ident, $f:ident, $v:ident, sint16) => { if let Value::Int(x) = $v { $s.$f = x as i16 } };
    ($s:ident, $f:ident, $v:ident, uint16) => { if let Value::Uint(x) = $v { $s.$f = x as u16 } };
    ($s:ident, $f:ident, $v:ident, uint16z) => { if let Value::Uint(x) = $v { $s.$f = x as u16 } };
    ($s:ident, $f:ident, $v:ident, sint32) => { if let Value::Int(x) = $v { $s.$f = x as i32 } };
    ($s:ident, $f:ident, $v:ident, uint32) => { if let Value::Uint(x) = $v { $s.$f = x as u32 } };
    ($s:ident, $f:ident, $v:ident, uint32z) => { if let Value::Uint(x) = $v { $s.$f = x as u32 } };
    ($s:ident, $f:ident, $v:ident, float32) => { if let Value::Float(x) = $v { $s.$f = x as f32 } };
    ($s:ident, $f:ident, $v:ident, float64) => { if let Value::Float(x) = $v { $s.$f = x } };
    ($s:ident, $f:ident, $v:ident, string) => { if let Value::Str(x) = $v { $s.$f = x } };
    ($s:ident, $f:ident, $v:ident, timestamp) => { if let Value::Time(x) = $v { $s.$f = Some(x) } };
    ($s:ident, $f:ident, $v:ident, local_timestamp) => { if let Value::LocalTime(x) = $v { $s.$f = Some(x) } };
    ($s:ident, $f:ident, $v:ident, lat) => { if let Value::Lat(x) = $v { $s.$f = x } };
    ($s:ident, $f:ident, $v:ident, lng) => { if let Value::Lng(x) = $v { $s.$f = x } };
    ($s:ident, $f:ident, $v:ident, [byte]) => { if let Value::Bytes(x) = $v { $s.$f = x } };
    ($s:ident, $f:ident, $v:ident, [string]) => { if let Value::StrArray(x) = $v { $s.$f = x } };
    ($s:ident, $f:ident, $v:ident, [enum_]) => { if let Value::UintArray(x) = $v { $s.$f = x.into_iter().map(|e| e as u8).collect() } };
    ($s:ident, $f:ident, $v:ident, [uint8]) => { if let Value::UintArray(x) = $v { $s.$f = x.into_iter().map(|e| e as u8).collect() } };
    ($s:ident, $f:ident, $v:ident, [uint8z]) => { if let Value::UintArray(x) = $v { $s.$f = x.into_iter().map(|e| e as u8).collect() } };
    ($s:ident, $f:ident, $v:ident, [uint16]) => { if let Value::UintArray(x) = $v { $s.$f = x.into_iter().map(|e| e as u16).collect() } };
    ($s:ident, $f:ident, $v:ident, [uint16z]) => { if let Value::UintArray(x) = $v { $s.$f = x.into_iter().map(|e| e as u16).collect() } };
    ($s:ident, $f:ident, $v:ident, [uint32]) => { if let Value::UintArray(x) = $v { $s.$f = x.into_iter().map(|e| e as u32).collect() } };
    ($s:ident, $f:ident, $v:ident, [uint32z]) => { if let Value::UintArray(x) = $v { $s.$f = x.into_iter().map(|e| e as u32).collect() } };
    ($s:ident, $f:ident, $v:ident, [sint8]) => { if let Value::IntArray(x) = $v { $s.$f = x.into_iter().map(|e| e as i8).collect() } };
    ($s:ident, $f:ident, $v:ident, [sint16]) => { if let Value::IntArray(x) = $v { $s.$f = x.into_iter().map(|e| e as i16).collect() } };
    ($s:ident, $f:ident, $v:ident, [sint32]) => { if let Value::IntArray(x) = $v { $s.$f = x.into_iter().map(|e| e as i32).collect() } };
    ($s:ident, $f:ident, $v:ident, [float32]) => { if let Value::FloatArray(x) = $v { $s.$f = x.into_iter().map(|e| e as f32).collect() } };
    ($s:ident, $f:ident, $v:ident, [float64]) => { if let Value::FloatArray(x) = $v { $s.$f = x } };
}

macro_rules! messages {
    ($(
        $(#[$meta:meta])*
        $num_name:ident = $num_val:literal, $var:ident, $msg:ident {
            $( $fnum:literal => $field:ident : $decl:tt ),* $(,)?
        }
    )*) => {
        $( pub const $num_name: u16 = $num_val; )*

        $(
            $(#[$meta])*
            #[derive(Clone, Debug, PartialEq)]
            pub struct $msg {
                $( pub $field: field_ty!($decl), )*
            }

            impl $msg {
                /// Construct an instance with every field at its invalid
                /// value.
                pub fn new() -> $msg {
                    $msg {
                        $( $field: field_init!($decl), )*
                    }
                }

                pub(crate) fn set_field(&mut self, num: u8, value: Value) {
                    match num {
                        $( $fnum => set_field_arm!(self, $field, value, $decl), )*
                        _ => {}
                    }
                }

                pub(crate) const FIELDS: &'static [FieldInfo] = &[
                    $( field_info!($fnum, $decl), )*
                ];
            }

            impl Default for $msg {
                fn default() -> $msg {
                    $msg::new()
                }
            }
        )*

        /// A decoded message of any known kind.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Message {
            $( $var($msg), )*
        }

        impl Message {
            /// Construct an all-invalid message for a global message number,
            /// or `None` if the number is not in the profile.
            pub(crate) fn new(mesg_num: u16) -> Option<Message> {
                match mesg_num {
                    $( $num_name => Some(Message::$var($msg::new())), )*
                    _ => None,
                }
            }

            pub(crate) fn set_field(&mut self, num: u8, value: Value) {
                match self {
                    $( Message::$var(m) => m.set_field(num, value), )*
                }
            }

            /// The global message number of this message.
            pub fn mesg_num(&self) -> u16 {
                match self {
                    $( Message::$var(_) => $num_name, )*
                }
            }
        }

        /// Whether a global message number is in the profile.
        pub fn known(mesg_num: u16) -> bool {
            matches!(mesg_num, $( $num_name )|*)
        }

        /// Look up the profile metadata for a field of a message.
        pub fn field(mesg_num: u16, field_num: u8) -> Option<&'static FieldInfo> {
            let fields: &[FieldInfo] = match mesg_num {
                $( $num_name => $msg::FIELDS, )*
                _ => return None,
            };

            fields.iter().find(|f| f.num == field_num)
        }
    };
}

messages! {
    /// Identifies a file's type, maker, and moment of creation. Mandatory
    /// first message of every document.
    FILE_ID = 0, FileId, FileIdMsg {
        0 => file_type: enum_,
        1 => manufacturer: uint16,
        2 => product: uint16,
        3 => serial_number: uint32z,
        4 => time_created: timestamp,
        5 => number: uint16,
        8 => product_name: string,
    }

    CAPABILITIES = 1, Capabilities, CapabilitiesMsg {
        0 => languages: [uint8z],
        1 => sports: [uint8z],
        21 => workouts_supported: uint32z,
        23 => connectivity_supported: uint32z,
    }

    DEVICE_SETTINGS = 2, DeviceSettings, DeviceSettingsMsg {
        0 => active_time_zone: uint8,
        1 => utc_offset: uint32,
        2 => time_offset: [uint32],
    }

    USER_PROFILE = 3, UserProfile, UserProfileMsg {
        254 => message_index: uint16,
        0 => friendly_name: string,
        1 => gender: enum_,
        2 => age: uint8,
        3 => height: uint8,
        4 => weight: uint16,
        5 => language: enum_,
        21 => resting_heart_rate: uint8,
    }

    HRM_PROFILE = 4, HrmProfile, HrmProfileMsg {
        254 => message_index: uint16,
        0 => enabled: enum_,
        1 => hrm_ant_id: uint16z,
        2 => log_hrv: enum_,
        3 => hrm_ant_id_trans_type: uint8z,
    }

    SDM_PROFILE = 5, SdmProfile, SdmProfileMsg {
        254 => message_index: uint16,
        0 => enabled: enum_,
        1 => sdm_ant_id: uint16z,
        2 => sdm_cal_factor: uint16,
        3 => odometer: uint32,
        4 => speed_source: enum_,
    }

    BIKE_PROFILE = 6, BikeProfile, BikeProfileMsg {
        254 => message_index: uint16,
        0 => name: string,
        1 => sport: enum_,
        2 => sub_sport: enum_,
        3 => odometer: uint32,
        8 => bike_weight: uint16,
        9 => power_cal_factor: uint16,
    }

    ZONES_TARGET = 7, ZonesTarget, ZonesTargetMsg {
        1 => max_heart_rate: uint8,
        2 => threshold_heart_rate: uint8,
        3 => functional_threshold_power: uint16,
        5 => hr_calc_type: enum_,
        7 => pwr_calc_type: enum_,
    }

    HR_ZONE = 8, HrZone, HrZoneMsg {
        254 => message_index: uint16,
        1 => high_bpm: uint8,
        2 => name: string,
    }

    POWER_ZONE = 9, PowerZone, PowerZoneMsg {
        254 => message_index: uint16,
        1 => high_value: uint16,
        2 => name: string,
    }

    MET_ZONE = 10, MetZone, MetZoneMsg {
        254 => message_index: uint16,
        1 => high_bpm: uint8,
        2 => calories: uint16,
        3 => fat_calories: uint8,
    }

    SPORT = 12, Sport, SportMsg {
        0 => sport: enum_,
        1 => sub_sport: enum_,
        3 => name: string,
    }

    GOAL = 15, Goal, GoalMsg {
        0 => sport: enum_,
        1 => sub_sport: enum_,
        2 => start_date: timestamp,
        3 => end_date: timestamp,
        4 => goal_type: enum_,
        5 => value: uint32,
        7 => target_value: uint32,
        8 => recurrence: enum_,
    }

    /// Per-activity summary of one sport interval.
    SESSION = 18, Session, SessionMsg {
        253 => timestamp: timestamp,
        254 => message_index: uint16,
        0 => event: enum_,
        1 => event_type: enum_,
        2 => start_time: timestamp,
        3 => start_position_lat: lat,
        4 => start_position_long: lng,
        5 => sport: enum_,
        6 => sub_sport: enum_,
        7 => total_elapsed_time: uint32,
        8 => total_timer_time: uint32,
        9 => total_distance: uint32,
        11 => total_calories: uint16,
        14 => avg_speed: uint16,
        15 => max_speed: uint16,
        16 => avg_heart_rate: uint8,
        17 => max_heart_rate: uint8,
    }

    LAP = 19, Lap, LapMsg {
        253 => timestamp: timestamp,
        254 => message_index: uint16,
        0 => event: enum_,
        1 => event_type: enum_,
        2 => start_time: timestamp,
        3 => start_position_lat: lat,
        4 => start_position_long: lng,
        5 => end_position_lat: lat,
        6 => end_position_long: lng,
        7 => total_elapsed_time: uint32,
        8 => total_timer_time: uint32,
        9 => total_distance: uint32,
        11 => total_calories: uint16,
        13 => avg_speed: uint16,
        14 => max_speed: uint16,
        15 => avg_heart_rate: uint8,
        16 => max_heart_rate: uint8,
    }

    /// One sample of the recorded track.
    RECORD = 20, Record, RecordMsg {
        253 => timestamp: timestamp,
        0 => position_lat: lat,
        1 => position_long: lng,
        2 => altitude: uint16,
        3 => heart_rate: uint8,
        4 => cadence: uint8,
        5 => distance: uint32,
        6 => speed: uint16,
        7 => power: uint16,
        8 => compressed_speed_distance: [byte],
        13 => temperature: sint8,
        30 => left_right_balance: uint8,
        114 => grit: float32,
        115 => flow: float32,
    }

    EVENT = 21, Event, EventMsg {
        253 => timestamp: timestamp,
        0 => event: enum_,
        1 => event_type: enum_,
        2 => data16: uint16,
        3 => data: uint32,
        4 => event_group: uint8,
    }

    DEVICE_INFO = 23, DeviceInfo, DeviceInfoMsg {
        253 => timestamp: timestamp,
        0 => device_index: uint8,
        1 => device_type: uint8,
        2 => manufacturer: uint16,
        3 => serial_number: uint32z,
        4 => product: uint16,
        5 => software_version: uint16,
        6 => hardware_version: uint8,
        10 => battery_voltage: uint16,
        11 => battery_status: uint8,
    }

    WORKOUT = 26, Workout, WorkoutMsg {
        4 => sport: enum_,
        5 => capabilities: uint32z,
        6 => num_valid_steps: uint16,
        8 => wkt_name: string,
    }

    WORKOUT_STEP = 27, WorkoutStep, WorkoutStepMsg {
        254 => message_index: uint16,
        0 => wkt_step_name: string,
        1 => duration_type: enum_,
        2 => duration_value: uint32,
        3 => target_type: enum_,
        4 => target_value: uint32,
        7 => intensity: enum_,
    }

    SCHEDULE = 28, Schedule, ScheduleMsg {
        0 => manufacturer: uint16,
        1 => product: uint16,
        2 => serial_number: uint32z,
        3 => time_created: timestamp,
        4 => completed: enum_,
        5 => schedule_type: enum_,
        6 => scheduled_time: local_timestamp,
    }

    WEIGHT_SCALE = 30, WeightScale, WeightScaleMsg {
        253 => timestamp: timestamp,
        0 => weight: uint16,
        1 => percent_fat: uint16,
        2 => percent_hydration: uint16,
        7 => basal_met: uint16,
        9 => active_met: uint16,
    }

    COURSE = 31, Course, CourseMsg {
        4 => sport: enum_,
        5 => name: string,
        6 => capabilities: uint32z,
    }

    COURSE_POINT = 32, CoursePoint, CoursePointMsg {
        254 => message_index: uint16,
        1 => timestamp: timestamp,
        2 => position_lat: lat,
        3 => position_long: lng,
        4 => distance: uint32,
        5 => point_type: enum_,
        6 => name: string,
    }

    TOTALS = 33, Totals, TotalsMsg {
        253 => timestamp: timestamp,
        254 => message_index: uint16,
        0 => timer_time: uint32,
        1 => distance: uint32,
        2 => calories: uint32,
        3 => sport: enum_,
        4 => elapsed_time: uint32,
        5 => sessions: uint16,
    }

    /// Top-level summary of a recorded activity.
    ACTIVITY = 34, Activity, ActivityMsg {
        253 => timestamp: timestamp,
        0 => total_timer_time: uint32,
        1 => num_sessions: uint16,
        2 => activity_type: enum_,
        3 => event: enum_,
        4 => event_type: enum_,
        5 => local_timestamp: local_timestamp,
        6 => event_group: uint8,
    }

    SOFTWARE = 35, Software, SoftwareMsg {
        254 => message_index: uint16,
        3 => version: uint16,
        5 => part_number: string,
    }

    FILE_CAPABILITIES = 37, FileCapabilities, FileCapabilitiesMsg {
        254 => message_index: uint16,
        0 => file_type: enum_,
        1 => flags: uint8z,
        2 => directory: string,
        3 => max_count: uint16,
        4 => max_size: uint32,
    }

    MESG_CAPABILITIES = 38, MesgCapabilities, MesgCapabilitiesMsg {
        254 => message_index: uint16,
        0 => file_type: enum_,
        1 => mesg_num: uint16,
        2 => count_type: enum_,
        3 => count: uint16,
    }

    FIELD_CAPABILITIES = 39, FieldCapabilities, FieldCapabilitiesMsg {
        254 => message_index: uint16,
        0 => file_type: enum_,
        1 => mesg_num: uint16,
        2 => field_num: uint8,
        3 => count: uint16,
    }

    BLOOD_PRESSURE = 51, BloodPressure, BloodPressureMsg {
        253 => timestamp: timestamp,
        0 => systolic_pressure: uint16,
        1 => diastolic_pressure: uint16,
        2 => mean_arterial_pressure: uint16,
        6 => heart_rate: uint8,
        9 => user_profile_index: uint16,
    }

    MONITORING = 55, Monitoring, MonitoringMsg {
        253 => timestamp: timestamp,
        0 => device_index: uint8,
        2 => calories: uint16,
        3 => distance: uint32,
        4 => cycles: uint32,
        5 => active_time: uint32,
        26 => timestamp_16: uint16,
        27 => heart_rate: uint8,
    }

    /// Beat-to-beat interval times, in milliseconds.
    HRV = 78, Hrv, HrvMsg {
        0 => time: [uint16],
    }

    MONITORING_INFO = 103, MonitoringInfo, MonitoringInfoMsg {
        253 => timestamp: timestamp,
        0 => local_timestamp: local_timestamp,
        1 => activity_type: [enum_],
        3 => cycles_to_distance: [uint16],
        4 => cycles_to_calories: [uint16],
    }

    SEGMENT_LAP = 142, SegmentLap, SegmentLapMsg {
        253 => timestamp: timestamp,
        254 => message_index: uint16,
        0 => event: enum_,
        1 => event_type: enum_,
        2 => start_time: timestamp,
        3 => start_position_lat: lat,
        4 => start_position_long: lng,
        7 => total_elapsed_time: uint32,
        9 => total_distance: uint32,
        29 => name: string,
    }

    SEGMENT_ID = 148, SegmentId, SegmentIdMsg {
        0 => name: string,
        1 => uuid: string,
        2 => sport: enum_,
        3 => enabled: enum_,
        4 => user_profile_primary_key: uint32,
        5 => device_id: uint32,
    }

    SEGMENT_LEADERBOARD_ENTRY = 149, SegmentLeaderboardEntry, SegmentLeaderboardEntryMsg {
        254 => message_index: uint16,
        0 => name: string,
        1 => leader_type: enum_,
        2 => group_primary_key: uint32,
        3 => activity_id: uint32,
        4 => segment_time: uint32,
    }

    SEGMENT_POINT = 150, SegmentPoint, SegmentPointMsg {
        254 => message_index: uint16,
        1 => position_lat: lat,
        2 => position_long: lng,
        3 => distance: uint32,
        4 => altitude: uint16,
        5 => leader_time: [uint32],
    }

    SEGMENT_FILE = 151, SegmentFile, SegmentFileMsg {
        254 => message_index: uint16,
        1 => file_uuid: string,
        3 => user_profile_primary_key: uint32,
        4 => leader_type: [enum_],
        7 => leader_activity_id: [uint32],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_starts_invalid() {
        let msg = RecordMsg::new();

        assert_eq!(msg.timestamp, None);
        assert_eq!(msg.heart_rate, u8::MAX);
        assert_eq!(msg.temperature, i8::MAX);
        assert_eq!(msg.distance, u32::MAX);
        assert!(!msg.position_lat.is_valid());
        assert!(msg.compressed_speed_distance.is_empty());
    }

    #[test]
    fn zero_terminated_types_start_at_zero() {
        let msg = FileIdMsg::new();

        assert_eq!(msg.serial_number, 0);
        assert_eq!(msg.manufacturer, u16::MAX);
        assert!(msg.product_name.is_empty());
    }

    #[test]
    fn set_field_narrows_widened_integers() {
        let mut msg = FileIdMsg::new();
        msg.set_field(1, Value::Uint(0x12));

        assert_eq!(msg.manufacturer, 0x12);
    }

    #[test]
    fn set_field_ignores_unknown_numbers() {
        let mut msg = FileIdMsg::new();
        msg.set_field(200, Value::Uint(7));

        assert_eq!(msg, FileIdMsg::new());
    }

    #[test]
    fn registry_lookup() {
        assert!(known(RECORD));
        assert!(!known(12345));

        let info = field(RECORD, 253).unwrap();
        assert_eq!(info.kind, FieldKind::TimeUtc);
        assert_eq!(info.base_type, BaseType::Uint32);

        let info = field(HRV, 0).unwrap();
        assert!(info.array);
        assert_eq!(info.base_type, BaseType::Uint16);

        assert!(field(RECORD, 200).is_none());
        assert!(field(12345, 0).is_none());
    }

    #[test]
    fn message_union_routes_setters() {
        let mut msg = Message::new(RECORD).unwrap();
        msg.set_field(3, Value::Uint(150));

        match msg {
            Message::Record(m) => assert_eq!(m.heart_rate, 150),
            _ => panic!("wrong variant"),
        }

        assert!(Message::new(12345).is_none());
    }
}
