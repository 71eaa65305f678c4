//! The decoded document and its file-type-specific containers.
//!
//! Every document carries exactly one sub-container, chosen from the
//! `type` field of its FileId message. The sub-container is the sole
//! destination for the messages that follow; each collects the kinds its
//! file type is specified to hold and drops the rest.

use std::collections::BTreeMap;

use log::debug;

use crate::decode::{Error, FormatError, NotSupportedError};
use crate::decode::header::Header;
use crate::profile::messages::*;

/// File type values of the profile's `file` enum.
pub mod file_type {
    pub const DEVICE: u8 = 1;
    pub const SETTINGS: u8 = 2;
    pub const SPORT: u8 = 3;
    pub const ACTIVITY: u8 = 4;
    pub const WORKOUT: u8 = 5;
    pub const COURSE: u8 = 6;
    pub const SCHEDULES: u8 = 7;
    pub const WEIGHT: u8 = 9;
    pub const TOTALS: u8 = 10;
    pub const GOALS: u8 = 11;
    pub const BLOOD_PRESSURE: u8 = 14;
    pub const MONITORING_A: u8 = 15;
    pub const ACTIVITY_SUMMARY: u8 = 20;
    pub const MONITORING_DAILY: u8 = 28;
    pub const MONITORING_B: u8 = 32;
    pub const SEGMENT: u8 = 34;
    pub const SEGMENT_LIST: u8 = 35;

    /// Start of the band reserved for manufacturer-specific file types.
    pub const MFG_RANGE_MIN: u8 = 0xF7;
    /// End of the band reserved for manufacturer-specific file types.
    pub const MFG_RANGE_MAX: u8 = 0xFE;
    /// The invalid marker of the `file` enum.
    pub const INVALID: u8 = 0xFF;
}

/// A field of a message not described by the profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnknownField {
    /// The global message number the field was seen under.
    pub mesg_num: u16,
    /// The field definition number.
    pub field_num: u8,
}

/// A fully decoded document.
#[derive(Clone, Debug)]
pub struct Fit {
    /// The file header.
    pub header: Header,
    /// The trailing checksum as stored in the file.
    pub crc: u16,
    /// The mandatory first message.
    pub file_id: FileIdMsg,
    /// Occurrence counts for global message numbers not in the profile.
    pub unknown_messages: BTreeMap<u16, usize>,
    /// Occurrence counts for fields not in the profile.
    pub unknown_fields: BTreeMap<UnknownField, usize>,
    /// The file-type-specific container.
    pub file: File,
}

macro_rules! container_field_ty {
    (one, $ty:ident) => { Option<$ty> };
    (many, $ty:ident) => { Vec<$ty> };
}

macro_rules! container_add {
    (one, $s:ident, $f:ident, $m:ident) => { $s.$f = Some($m) };
    (many, $s:ident, $f:ident, $m:ident) => { $s.$f.push($m) };
}

macro_rules! container {
    ($(#[$meta:meta])* $name:ident {
        $( $var:ident($ty:ident) => $field:ident: $slot:ident ),* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            $( pub $field: container_field_ty!($slot, $ty), )*
        }

        impl $name {
            fn add(&mut self, msg: Message, debug: bool) {
                match msg {
                    $( Message::$var(m) => container_add!($slot, self, $field, m), )*
                    other => {
                        if debug {
                            debug!(
                                "{} container dropped a message (global number {})",
                                stringify!($name),
                                other.mesg_num(),
                            );
                        }
                    }
                }
            }
        }
    };
}

container! {
    /// Messages of a recorded activity.
    ActivityFile {
        Activity(ActivityMsg) => activity: one,
        Session(SessionMsg) => sessions: many,
        Lap(LapMsg) => laps: many,
        Record(RecordMsg) => records: many,
        Event(EventMsg) => events: many,
        Hrv(HrvMsg) => hrvs: many,
        DeviceInfo(DeviceInfoMsg) => device_infos: many,
    }
}

container! {
    DeviceFile {
        Software(SoftwareMsg) => softwares: many,
        Capabilities(CapabilitiesMsg) => capabilities: many,
        FileCapabilities(FileCapabilitiesMsg) => file_capabilities: many,
        MesgCapabilities(MesgCapabilitiesMsg) => mesg_capabilities: many,
        FieldCapabilities(FieldCapabilitiesMsg) => field_capabilities: many,
    }
}

container! {
    SettingsFile {
        DeviceSettings(DeviceSettingsMsg) => device_settings: one,
        UserProfile(UserProfileMsg) => user_profiles: many,
        HrmProfile(HrmProfileMsg) => hrm_profiles: many,
        SdmProfile(SdmProfileMsg) => sdm_profiles: many,
        BikeProfile(BikeProfileMsg) => bike_profiles: many,
    }
}

container! {
    SportFile {
        ZonesTarget(ZonesTargetMsg) => zones_target: one,
        Sport(SportMsg) => sport: one,
        HrZone(HrZoneMsg) => hr_zones: many,
        PowerZone(PowerZoneMsg) => power_zones: many,
        MetZone(MetZoneMsg) => met_zones: many,
    }
}

container! {
    WorkoutFile {
        Workout(WorkoutMsg) => workout: one,
        WorkoutStep(WorkoutStepMsg) => workout_steps: many,
    }
}

container! {
    CourseFile {
        Course(CourseMsg) => course: one,
        CoursePoint(CoursePointMsg) => course_points: many,
        Lap(LapMsg) => laps: many,
        Record(RecordMsg) => records: many,
        Event(EventMsg) => events: many,
    }
}

container! {
    SchedulesFile {
        Schedule(ScheduleMsg) => schedules: many,
    }
}

container! {
    WeightFile {
        UserProfile(UserProfileMsg) => user_profile: one,
        WeightScale(WeightScaleMsg) => weight_scales: many,
        DeviceInfo(DeviceInfoMsg) => device_infos: many,
    }
}

container! {
    TotalsFile {
        Totals(TotalsMsg) => totals: many,
    }
}

container! {
    GoalsFile {
        Goal(GoalMsg) => goals: many,
    }
}

container! {
    BloodPressureFile {
        UserProfile(UserProfileMsg) => user_profile: one,
        BloodPressure(BloodPressureMsg) => blood_pressures: many,
        DeviceInfo(DeviceInfoMsg) => device_infos: many,
    }
}

container! {
    MonitoringAFile {
        MonitoringInfo(MonitoringInfoMsg) => monitoring_info: one,
        Monitoring(MonitoringMsg) => monitorings: many,
        DeviceInfo(DeviceInfoMsg) => device_infos: many,
    }
}

container! {
    ActivitySummaryFile {
        Activity(ActivityMsg) => activity: one,
        Session(SessionMsg) => sessions: many,
        Lap(LapMsg) => laps: many,
    }
}

container! {
    MonitoringDailyFile {
        MonitoringInfo(MonitoringInfoMsg) => monitoring_info: one,
        Monitoring(MonitoringMsg) => monitorings: many,
    }
}

container! {
    MonitoringBFile {
        MonitoringInfo(MonitoringInfoMsg) => monitoring_info: one,
        Monitoring(MonitoringMsg) => monitorings: many,
        DeviceInfo(DeviceInfoMsg) => device_infos: many,
    }
}

container! {
    SegmentFile {
        SegmentId(SegmentIdMsg) => segment_id: one,
        SegmentLap(SegmentLapMsg) => segment_laps: many,
        SegmentPoint(SegmentPointMsg) => segment_points: many,
        SegmentLeaderboardEntry(SegmentLeaderboardEntryMsg) => leaderboard_entries: many,
    }
}

container! {
    SegmentListFile {
        SegmentFile(SegmentFileMsg) => segment_files: many,
    }
}

/// The file-type-specific container of a document.
#[derive(Clone, Debug, PartialEq)]
pub enum File {
    Activity(ActivityFile),
    Device(DeviceFile),
    Settings(SettingsFile),
    Sport(SportFile),
    Workout(WorkoutFile),
    Course(CourseFile),
    Schedules(SchedulesFile),
    Weight(WeightFile),
    Totals(TotalsFile),
    Goals(GoalsFile),
    BloodPressure(BloodPressureFile),
    MonitoringA(MonitoringAFile),
    MonitoringDaily(MonitoringDailyFile),
    MonitoringB(MonitoringBFile),
    ActivitySummary(ActivitySummaryFile),
    Segment(SegmentFile),
    SegmentList(SegmentListFile),
}

impl File {
    /// Instantiate the container for a FileId `type` value.
    pub(crate) fn with_type(t: u8) -> Result<File, Error> {
        Ok(match t {
            file_type::ACTIVITY => File::Activity(Default::default()),
            file_type::DEVICE => File::Device(Default::default()),
            file_type::SETTINGS => File::Settings(Default::default()),
            file_type::SPORT => File::Sport(Default::default()),
            file_type::WORKOUT => File::Workout(Default::default()),
            file_type::COURSE => File::Course(Default::default()),
            file_type::SCHEDULES => File::Schedules(Default::default()),
            file_type::WEIGHT => File::Weight(Default::default()),
            file_type::TOTALS => File::Totals(Default::default()),
            file_type::GOALS => File::Goals(Default::default()),
            file_type::BLOOD_PRESSURE => File::BloodPressure(Default::default()),
            file_type::MONITORING_A => File::MonitoringA(Default::default()),
            file_type::ACTIVITY_SUMMARY => File::ActivitySummary(Default::default()),
            file_type::MONITORING_DAILY => File::MonitoringDaily(Default::default()),
            file_type::MONITORING_B => File::MonitoringB(Default::default()),
            file_type::SEGMENT => File::Segment(Default::default()),
            file_type::SEGMENT_LIST => File::SegmentList(Default::default()),
            file_type::INVALID => return Err(FormatError::InvalidFileType.into()),
            t if (file_type::MFG_RANGE_MIN..=file_type::MFG_RANGE_MAX).contains(&t) => {
                return Err(NotSupportedError::ManufacturerFileType(t).into())
            }
            t => return Err(FormatError::UnknownFileType(t).into()),
        })
    }

    /// Append a decoded message to the container, reporting drops when
    /// `debug` diagnostics are on.
    pub(crate) fn add(&mut self, msg: Message, debug: bool) {
        match self {
            File::Activity(f) => f.add(msg, debug),
            File::Device(f) => f.add(msg, debug),
            File::Settings(f) => f.add(msg, debug),
            File::Sport(f) => f.add(msg, debug),
            File::Workout(f) => f.add(msg, debug),
            File::Course(f) => f.add(msg, debug),
            File::Schedules(f) => f.add(msg, debug),
            File::Weight(f) => f.add(msg, debug),
            File::Totals(f) => f.add(msg, debug),
            File::Goals(f) => f.add(msg, debug),
            File::BloodPressure(f) => f.add(msg, debug),
            File::MonitoringA(f) => f.add(msg, debug),
            File::MonitoringDaily(f) => f.add(msg, debug),
            File::MonitoringB(f) => f.add(msg, debug),
            File::ActivitySummary(f) => f.add(msg, debug),
            File::Segment(f) => f.add(msg, debug),
            File::SegmentList(f) => f.add(msg, debug),
        }
    }
}

macro_rules! file_accessors {
    ($( $fn_name:ident => $var:ident($ty:ident) ),* $(,)?) => {
        impl Fit {
            $(
                /// The sub-container of this file type, if the document is
                /// of it.
                pub fn $fn_name(&self) -> Option<&$ty> {
                    match &self.file {
                        File::$var(f) => Some(f),
                        _ => None,
                    }
                }
            )*
        }
    };
}

file_accessors! {
    activity => Activity(ActivityFile),
    device => Device(DeviceFile),
    settings => Settings(SettingsFile),
    sport => Sport(SportFile),
    workout => Workout(WorkoutFile),
    course => Course(CourseFile),
    schedules => Schedules(SchedulesFile),
    weight => Weight(WeightFile),
    totals => Totals(TotalsFile),
    goals => Goals(GoalsFile),
    blood_pressure => BloodPressure(BloodPressureFile),
    monitoring_a => MonitoringA(MonitoringAFile),
    monitoring_daily => MonitoringDaily(MonitoringDailyFile),
    monitoring_b => MonitoringB(MonitoringBFile),
    activity_summary => ActivitySummary(ActivitySummaryFile),
    segment => Segment(SegmentFile),
    segment_list => SegmentList(SegmentListFile),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_selects_by_type() {
        assert!(matches!(
            File::with_type(file_type::ACTIVITY),
            Ok(File::Activity(_))
        ));
        assert!(matches!(
            File::with_type(file_type::SEGMENT_LIST),
            Ok(File::SegmentList(_))
        ));
    }

    #[test]
    fn router_rejects_reserved_types() {
        assert!(matches!(
            File::with_type(file_type::INVALID),
            Err(Error::Format(FormatError::InvalidFileType))
        ));
        assert!(matches!(
            File::with_type(0xF7),
            Err(Error::NotSupported(NotSupportedError::ManufacturerFileType(0xF7)))
        ));
        assert!(matches!(
            File::with_type(0xFE),
            Err(Error::NotSupported(NotSupportedError::ManufacturerFileType(0xFE)))
        ));
        // A gap inside the known band and the band above it are both
        // unknown, not manufacturer-specific.
        assert!(matches!(
            File::with_type(8),
            Err(Error::Format(FormatError::UnknownFileType(8)))
        ));
        assert!(matches!(
            File::with_type(0x40),
            Err(Error::Format(FormatError::UnknownFileType(0x40)))
        ));
    }

    #[test]
    fn containers_route_and_drop() {
        let mut file = File::with_type(file_type::ACTIVITY).unwrap();

        file.add(Message::new(RECORD).unwrap(), false);
        file.add(Message::new(RECORD).unwrap(), false);
        file.add(Message::new(ACTIVITY).unwrap(), false);
        // An activity file does not collect weight-scale messages.
        file.add(Message::new(WEIGHT_SCALE).unwrap(), true);

        let File::Activity(f) = file else {
            panic!("wrong container");
        };
        assert_eq!(f.records.len(), 2);
        assert!(f.activity.is_some());
    }
}
