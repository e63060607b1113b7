//! Small table of user-facing strings per language.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, poise::ChoiceParameter)]
pub enum Locale {
    #[default]
    #[name = "English (US)"]
    EnUs,
    #[name = "Bahasa Indonesia"]
    IdId,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::EnUs => "en_US",
            Locale::IdId => "id_ID",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_lowercase().as_str() {
            "en_us" | "en" => Ok(Locale::EnUs),
            "id_id" | "id" => Ok(Locale::IdId),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    GenericError,
    NotRegistered,
    TargetNotRegistered,
    AlreadyRegistered,
    Registered,
    Unregistered,
    PlatformNotLinked,
    NoResults,
    NotConfigured,
    SettingsSaved,
    SettingsReset,
    BirthdayInvalidDate,
    BirthdayFutureYear,
    BirthdayBadOffset,
    BirthdaySaved,
    BirthdayRemoved,
    BirthdayNotSet,
    BirthdayTargetNotSet,
    QrTooLong,
}

pub fn t(locale: Locale, message: Message) -> &'static str {
    use Message::*;
    match (locale, message) {
        (Locale::EnUs, GenericError) => "Something went wrong while running that command. Please try again later.",
        (Locale::EnUs, NotRegistered) => "You are not registered yet. Use `/register` with your MyAnimeList username first.",
        (Locale::EnUs, TargetNotRegistered) => "That user has not registered with the bot.",
        (Locale::EnUs, AlreadyRegistered) => "You are already registered.",
        (Locale::EnUs, Registered) => "Registration complete.",
        (Locale::EnUs, Unregistered) => "Your data has been removed from the database.",
        (Locale::EnUs, PlatformNotLinked) => "No account is linked for that platform. Use `/platform link` or pass a username.",
        (Locale::EnUs, NoResults) => "No results found.",
        (Locale::EnUs, NotConfigured) => "This feature is not configured on this bot instance.",
        (Locale::EnUs, SettingsSaved) => "Settings saved.",
        (Locale::EnUs, SettingsReset) => "Settings reset to defaults.",
        (Locale::EnUs, BirthdayInvalidDate) => "That date does not exist.",
        (Locale::EnUs, BirthdayFutureYear) => "Birth year cannot be in the future.",
        (Locale::EnUs, BirthdayBadOffset) => "UTC offset must be between -840 and +840 minutes.",
        (Locale::EnUs, BirthdaySaved) => "Birthday saved.",
        (Locale::EnUs, BirthdayRemoved) => "Birthday removed.",
        (Locale::EnUs, BirthdayNotSet) => "You have no birthday saved on this server.",
        (Locale::EnUs, BirthdayTargetNotSet) => "That member has no birthday saved on this server.",
        (Locale::EnUs, QrTooLong) => "That text is too long to fit in a QR code link. Try a shorter one.",

        (Locale::IdId, GenericError) => "Terjadi kesalahan saat menjalankan perintah. Silakan coba lagi nanti.",
        (Locale::IdId, NotRegistered) => "Kamu belum terdaftar. Gunakan `/register` dengan nama pengguna MyAnimeList kamu.",
        (Locale::IdId, TargetNotRegistered) => "Pengguna tersebut belum terdaftar.",
        (Locale::IdId, AlreadyRegistered) => "Kamu sudah terdaftar.",
        (Locale::IdId, Registered) => "Pendaftaran selesai.",
        (Locale::IdId, Unregistered) => "Data kamu telah dihapus dari basis data.",
        (Locale::IdId, PlatformNotLinked) => "Belum ada akun yang ditautkan untuk platform itu. Gunakan `/platform link` atau isi nama pengguna.",
        (Locale::IdId, NoResults) => "Tidak ada hasil.",
        (Locale::IdId, NotConfigured) => "Fitur ini belum dikonfigurasi pada bot ini.",
        (Locale::IdId, SettingsSaved) => "Pengaturan disimpan.",
        (Locale::IdId, SettingsReset) => "Pengaturan dikembalikan ke bawaan.",
        (Locale::IdId, BirthdayInvalidDate) => "Tanggal tersebut tidak ada.",
        (Locale::IdId, BirthdayFutureYear) => "Tahun lahir tidak boleh di masa depan.",
        (Locale::IdId, BirthdayBadOffset) => "Selisih UTC harus antara -840 dan +840 menit.",
        (Locale::IdId, BirthdaySaved) => "Ulang tahun disimpan.",
        (Locale::IdId, BirthdayRemoved) => "Ulang tahun dihapus.",
        (Locale::IdId, BirthdayNotSet) => "Kamu belum menyimpan ulang tahun di server ini.",
        (Locale::IdId, BirthdayTargetNotSet) => "Anggota tersebut belum menyimpan ulang tahun di server ini.",
        (Locale::IdId, QrTooLong) => "Teks terlalu panjang untuk tautan kode QR. Coba yang lebih pendek.",
    }
}
